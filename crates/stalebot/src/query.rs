//! JQL for the issues the bot considers.

use crate::config::Config;

impl Config {
    /// JQL selecting eligible issues, most recently updated first.
    ///
    /// Labels and the project key are not quoted; validation restricts them
    /// to characters JQL accepts bare.
    #[must_use]
    pub fn eligible_issues_query(&self) -> String {
        let mut clauses = vec![
            format!("project = {}", self.project),
            "statusCategory != Done".to_string(),
        ];
        clauses.extend(self.label_clauses());
        format!("{} ORDER BY updatedDate DESC", clauses.join(" AND "))
    }

    fn label_clauses(&self) -> Vec<String> {
        if !self.exempt_labels.is_empty() {
            vec![format!(
                "(labels not in ({}) OR labels is EMPTY)",
                self.exempt_labels.join(",")
            )]
        } else {
            self.only_labels
                .iter()
                .map(|label| format!("labels = {label}"))
                .collect()
        }
    }
}
