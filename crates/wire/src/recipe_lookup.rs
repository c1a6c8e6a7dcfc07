// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use osconfig_core::RecipeSpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLookupRequest {
    pub instance_id: String,
}

/// The server's answer: the set of recipes this host should converge to,
/// sent as full bodies rather than references (the server owns the only
/// durable copy of a recipe's definition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLookupResponse {
    pub recipes: Vec<RecipeSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use osconfig_core::{DesiredState, RecipeVersion};
    use std::collections::HashMap;

    #[test]
    fn response_round_trips_through_json() {
        let response = RecipeLookupResponse {
            recipes: vec![RecipeSpec {
                name: "foo".into(),
                version: RecipeVersion::parse("1.2.3").unwrap(),
                desired_state: DesiredState::Installed,
                artifacts: HashMap::new(),
                install_steps: vec![],
                update_steps: vec![],
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: RecipeLookupResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recipes.len(), 1);
        assert_eq!(back.recipes[0].name, "foo");
    }
}
