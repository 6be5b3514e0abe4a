use crate::cmd::{ConnectArgs, ScriptAction, ScriptArgs};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{print_report, CommandReport, OutputFormat};

pub fn run(args: ScriptArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ctl = conn.open()?;

    let report = match args.action {
        ScriptAction::Run {
            subroutine,
            param: Some(param),
        } => {
            ctl.run_script_subroutine_with_parameter(subroutine, param)
                .map_err(|err| controller_error("run subroutine failed", err))?;
            let mut report = CommandReport::new("run_script_subroutine_with_parameter");
            report.requested = Some(param);
            report
        }
        ScriptAction::Run {
            subroutine,
            param: None,
        } => {
            ctl.run_script_subroutine(subroutine)
                .map_err(|err| controller_error("run subroutine failed", err))?;
            tracing::debug!(subroutine, "started subroutine");
            CommandReport::new("run_script_subroutine")
        }
        ScriptAction::Stop => {
            ctl.stop_script()
                .map_err(|err| controller_error("stop script failed", err))?;
            CommandReport::new("stop_script")
        }
    };

    print_report(&report, format);
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}
