//! Search sequence

use std::path::Path;

use super::{queries, Wizard};
use crate::common::{Error, Result};
use crate::dialog::{Dialog, Query};
use crate::exec::Executor;
use crate::tool::{extension_name, Entity, SearchRequest};

impl<D: Dialog, E: Executor> Wizard<D, E> {
    /// Look up a principal or group through the authz extension
    ///
    /// Returns whether the tool succeeded.
    pub fn sequence_search(&mut self, layout_dir: &Path) -> Result<bool> {
        let request = self.ask_search_request()?;

        tracing::info!("{}", self.tr("Executing search sequence..."));
        let invocation = self.tool.search(layout_dir, &request);
        let execution = self.executor.execute(&invocation)?;

        if execution.success() {
            tracing::info!("Search sequence executed successfully");
        } else {
            tracing::error!("{}", self.tr("Search sequence failed"));
        }

        Ok(self.report(
            "Search output:",
            &execution,
            &[
                "Please make sure that entity details are correct and that depending on the type of the query group membership meets expectations (search for PrincipalRecord and GroupRecord titles).",
                "Abort if output is incorrect",
            ],
        ))
    }

    fn ask_search_request(&mut self) -> Result<SearchRequest> {
        let intro = self.tr("Please provide parameters for Search sequence:").to_string();
        self.dialog.note(&intro);

        let query = Query::new(
            queries::SEARCH_ENTITY,
            self.tr("Select entity to search (@VALUES@) [@DEFAULT@]: "),
        )
        .choices(Entity::ALL.map(Entity::as_str))
        .default(Entity::Principal.as_str());
        let answer = self.dialog.query_string(&query)?;
        let entity = Entity::parse(&answer).ok_or_else(|| {
            Error::invalid_answer(queries::SEARCH_ENTITY, &answer, &query.valid_values)
        })?;

        let query = Query::new(
            queries::SEARCH_NAME,
            self.tr("Term to search, trailing '*' is allowed: "),
        );
        let term = self.dialog.query_string(&query)?;

        let yes = self.tr("Yes").to_string();
        let no = self.tr("No").to_string();
        let query = Query::new(
            queries::SEARCH_RESOLVE_GROUPS,
            self.tr("Resolve Groups (@VALUES@) [@DEFAULT@]: "),
        )
        .choices([yes, no.clone()])
        .default(no.clone());
        let resolve_groups = self.dialog.query_string(&query)?.to_lowercase() != no.to_lowercase();

        Ok(SearchRequest {
            extension_name: extension_name(&self.profile.name, self.profile.use_vm_sso),
            entity,
            term,
            resolve_groups,
        })
    }
}
