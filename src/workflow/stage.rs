//! Workflow stages and per-run reports.

use std::fmt;

/// Steps of the build workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    CompileAbi,
    CompileBinary,
    GenerateBinding,
    VerifyByReadingManager,
    Done,
}

impl BuildStage {
    pub const FIRST: BuildStage = BuildStage::CompileAbi;

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(self) -> BuildStage {
        match self {
            BuildStage::CompileAbi => BuildStage::CompileBinary,
            BuildStage::CompileBinary => BuildStage::GenerateBinding,
            BuildStage::GenerateBinding => BuildStage::VerifyByReadingManager,
            BuildStage::VerifyByReadingManager | BuildStage::Done => BuildStage::Done,
        }
    }

    /// Failure in this stage is logged and the workflow carries on.
    pub fn is_diagnostic(self) -> bool {
        matches!(self, BuildStage::VerifyByReadingManager)
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::CompileAbi => "compile-abi",
            BuildStage::CompileBinary => "compile-binary",
            BuildStage::GenerateBinding => "generate-binding",
            BuildStage::VerifyByReadingManager => "verify-manager",
            BuildStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Steps of the deploy workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployStage {
    ReadBalance,
    Deploy,
    WaitMined,
    EnterLottery,
    /// Only visited when entries are awaited before reading players.
    ConfirmEntry,
    ReadBalanceAfterEntry,
    ReadPlayers,
    PickWinner,
    Done,
}

impl DeployStage {
    pub const FIRST: DeployStage = DeployStage::ReadBalance;

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(self, await_entry: bool) -> DeployStage {
        match self {
            DeployStage::ReadBalance => DeployStage::Deploy,
            DeployStage::Deploy => DeployStage::WaitMined,
            DeployStage::WaitMined => DeployStage::EnterLottery,
            DeployStage::EnterLottery if await_entry => DeployStage::ConfirmEntry,
            DeployStage::EnterLottery | DeployStage::ConfirmEntry => {
                DeployStage::ReadBalanceAfterEntry
            }
            DeployStage::ReadBalanceAfterEntry => DeployStage::ReadPlayers,
            DeployStage::ReadPlayers => DeployStage::PickWinner,
            DeployStage::PickWinner | DeployStage::Done => DeployStage::Done,
        }
    }

    /// Failure in this stage is logged and the workflow carries on.
    pub fn is_diagnostic(self) -> bool {
        matches!(
            self,
            DeployStage::ReadBalance | DeployStage::ReadBalanceAfterEntry | DeployStage::ReadPlayers
        )
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::ReadBalance => "read-balance",
            DeployStage::Deploy => "deploy",
            DeployStage::WaitMined => "wait-mined",
            DeployStage::EnterLottery => "enter-lottery",
            DeployStage::ConfirmEntry => "confirm-entry",
            DeployStage::ReadBalanceAfterEntry => "read-balance-after-entry",
            DeployStage::ReadPlayers => "read-players",
            DeployStage::PickWinner => "pick-winner",
            DeployStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A diagnostic stage that failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleratedFailure<S> {
    pub stage: S,
    pub error: String,
}

/// Which stages completed and which failed tolerably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport<S> {
    pub completed: Vec<S>,
    pub tolerated: Vec<ToleratedFailure<S>>,
}

impl<S> Default for StageReport<S> {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            tolerated: Vec::new(),
        }
    }
}

impl<S: Copy + PartialEq + fmt::Display> StageReport<S> {
    pub fn complete(&mut self, stage: S) {
        tracing::debug!(stage = %stage, "Stage complete");
        self.completed.push(stage);
    }

    /// Record a diagnostic failure and log it at `warn`.
    pub fn tolerate(&mut self, stage: S, error: impl fmt::Display) {
        let error = error.to_string();
        tracing::warn!(stage = %stage, error = %error, "Stage failed, continuing");
        self.tolerated.push(ToleratedFailure { stage, error });
    }

    pub fn is_completed(&self, stage: S) -> bool {
        self.completed.contains(&stage)
    }

    pub fn is_tolerated(&self, stage: S) -> bool {
        self.tolerated.iter().any(|t| t.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_stage_order() {
        let mut stage = BuildStage::FIRST;
        let mut visited = vec![stage];
        while stage != BuildStage::Done {
            stage = stage.next();
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                BuildStage::CompileAbi,
                BuildStage::CompileBinary,
                BuildStage::GenerateBinding,
                BuildStage::VerifyByReadingManager,
                BuildStage::Done,
            ]
        );
        assert!(BuildStage::VerifyByReadingManager.is_diagnostic());
        assert!(!BuildStage::CompileAbi.is_diagnostic());
    }

    fn deploy_path(await_entry: bool) -> Vec<DeployStage> {
        let mut stage = DeployStage::FIRST;
        let mut visited = vec![stage];
        while stage != DeployStage::Done {
            stage = stage.next(await_entry);
            visited.push(stage);
        }
        visited
    }

    #[test]
    fn test_deploy_stage_order() {
        assert_eq!(
            deploy_path(false),
            vec![
                DeployStage::ReadBalance,
                DeployStage::Deploy,
                DeployStage::WaitMined,
                DeployStage::EnterLottery,
                DeployStage::ReadBalanceAfterEntry,
                DeployStage::ReadPlayers,
                DeployStage::PickWinner,
                DeployStage::Done,
            ]
        );
        let awaited = deploy_path(true);
        assert_eq!(awaited[4], DeployStage::ConfirmEntry);
        assert_eq!(awaited.len(), 9);
    }

    #[test]
    fn test_fatal_deploy_stages() {
        for stage in [
            DeployStage::Deploy,
            DeployStage::WaitMined,
            DeployStage::EnterLottery,
            DeployStage::PickWinner,
        ] {
            assert!(!stage.is_diagnostic(), "{stage} must abort");
        }
    }

    #[test]
    fn test_report_records() {
        let mut report = StageReport::default();
        report.complete(DeployStage::ReadBalance);
        report.tolerate(DeployStage::ReadPlayers, "connection refused");
        assert!(report.is_completed(DeployStage::ReadBalance));
        assert!(report.is_tolerated(DeployStage::ReadPlayers));
        assert!(!report.is_completed(DeployStage::ReadPlayers));
        assert_eq!(report.tolerated[0].error, "connection refused");
    }
}
