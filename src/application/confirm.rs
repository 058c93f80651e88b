//! Interactive confirmation before handing a plan to the installer.

use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;

use super::plan::UpgradePlan;

pub const CONFIRM_PROMPT: &str = "==> Do you want to proceed with the upgrade? [y/n]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Abort,
}

/// Interpret one line of user input. `None` means the answer was not understood.
pub fn parse_answer(input: &str) -> Option<Confirmation> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Confirmation::Proceed),
        "n" | "no" => Some(Confirmation::Abort),
        _ => None,
    }
}

/// Show the plan summary and ask until the user answers yes or no.
///
/// End of input counts as no.
#[tracing::instrument(skip(runtime, plan))]
pub fn confirm_plan<R: Runtime + ?Sized>(runtime: &R, plan: &UpgradePlan) -> Result<Confirmation> {
    println!("{}", plan.summary());

    loop {
        let Some(line) = runtime.read_line(CONFIRM_PROMPT)? else {
            debug!("Input closed before an answer was given");
            return Ok(Confirmation::Abort);
        };
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
        debug!("Unrecognized answer {:?}", line);
    }
}
