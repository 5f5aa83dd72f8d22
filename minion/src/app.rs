//! Agent assembly: wires capability modules to the production host adapters.
//!
//! This is the only place that knows both the application layer and the
//! concrete infrastructure. Modules are built once here and live for the
//! lifetime of the process.

use func_common::MinionConfig;

use crate::application::AgentSurface;
use crate::application::exposure::Module;
use crate::application::modules::{CommandModule, RebootModule, ServiceModule};
use crate::domain::ExposureError;
use crate::infra::{InitDirProbe, TokioProcessRunner};

/// Build the agent-wide surface from `config`.
///
/// # Errors
///
/// Returns [`ExposureError`] if a module's declaration is malformed or two
/// modules expose the same operation name.
pub fn build_agent(config: &MinionConfig) -> Result<AgentSurface, ExposureError> {
    let runner = TokioProcessRunner::new(config.command_timeout());

    let command = Module::new(CommandModule::new(runner, config.which_bin.as_str()))?;
    let service = Module::new(ServiceModule::new(
        runner,
        InitDirProbe::new(&config.init_dirs),
        config.service_bin.as_str(),
    ))?;
    let reboot = Module::new(RebootModule::new(runner, config.shutdown_bin.as_str()))?;

    AgentSurface::compose([
        command.register_rpc(),
        service.register_rpc(),
        reboot.register_rpc(),
    ])
}
