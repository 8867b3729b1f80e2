use colored::Colorize;

pub mod apigateway;
pub mod catalog;
pub mod cost;
pub mod ec2;
pub mod ecs;
pub mod profiles;
pub mod s3;

/// Inline rendering of a failed provider call, context chain included.
pub(crate) fn error_line(e: &anyhow::Error) -> String {
    format!("{} {e:#}", "error:".red())
}

/// Report a failed call without leaving the current menu.
pub(crate) fn report(e: &anyhow::Error) {
    println!("{}", error_line(e));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_line_includes_context_chain() {
        let err: anyhow::Error = anyhow::anyhow!("connection reset");
        let err = err.context("Failed to list EC2 instances");
        let line = error_line(&err);
        assert!(line.contains("Failed to list EC2 instances"));
        assert!(line.contains("connection reset"));
    }
}
