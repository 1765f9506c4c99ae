use serde::{Deserialize, Serialize};

use crate::domain::quotation::OpportunityId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub source: Option<String>,
}

/// The slice of an opportunity the dashboard cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunitySummary {
    pub id: Option<OpportunityId>,
    pub stage: Option<String>,
}
