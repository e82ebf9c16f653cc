use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStage {
    Intake,
    Verification,
    InteractionCheck,
    StockCheck,
    PharmacistApproval,
    Dispense,
    Complete,
}

impl WorkflowStage {
    pub const ORDER: [WorkflowStage; 7] = [
        WorkflowStage::Intake,
        WorkflowStage::Verification,
        WorkflowStage::InteractionCheck,
        WorkflowStage::StockCheck,
        WorkflowStage::PharmacistApproval,
        WorkflowStage::Dispense,
        WorkflowStage::Complete,
    ];

    pub fn successor(self) -> Option<WorkflowStage> {
        use WorkflowStage::*;
        match self {
            Intake => Some(Verification),
            Verification => Some(InteractionCheck),
            InteractionCheck => Some(StockCheck),
            StockCheck => Some(PharmacistApproval),
            PharmacistApproval => Some(Dispense),
            Dispense => Some(Complete),
            Complete => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Intake => "intake",
            WorkflowStage::Verification => "verification",
            WorkflowStage::InteractionCheck => "interaction-check",
            WorkflowStage::StockCheck => "stock-check",
            WorkflowStage::PharmacistApproval => "pharmacist-approval",
            WorkflowStage::Dispense => "dispense",
            WorkflowStage::Complete => "complete",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStage {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        WorkflowStage::ORDER
            .iter()
            .copied()
            .find(|st| st.as_str() == s.trim())
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown workflow stage {}", s)))
    }
}

/// Only single forward steps along `WorkflowStage::ORDER` are legal.
pub fn valid_transition(from: WorkflowStage, to: WorkflowStage) -> bool {
    use WorkflowStage::*;
    matches!(
        (from, to),
        (Intake, Verification)
            | (Verification, InteractionCheck)
            | (InteractionCheck, StockCheck)
            | (StockCheck, PharmacistApproval)
            | (PharmacistApproval, Dispense)
            | (Dispense, Complete)
    )
}
