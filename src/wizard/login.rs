//! Login sequence

use std::path::Path;

use super::{queries, Wizard};
use crate::common::Result;
use crate::dialog::{Dialog, Query};
use crate::exec::{Executor, Secret};

impl<D: Dialog, E: Executor> Wizard<D, E> {
    /// Authenticate a user through the layout's profile
    ///
    /// Missing credentials are asked for. The password is registered with the
    /// log filter as soon as it is known. Returns whether the tool succeeded.
    pub fn sequence_login(
        &mut self,
        layout_dir: &Path,
        user: Option<String>,
        password: Option<Secret>,
    ) -> Result<bool> {
        let intro = self.tr("Please provide credentials to test login flow:").to_string();
        self.dialog.note(&intro);

        let user = match user {
            Some(user) => user,
            None => {
                let query = Query::new(queries::LOGIN_USER, self.tr("Enter user name: "));
                self.dialog.query_string(&query)?
            }
        };

        let password = match password {
            Some(password) => password,
            None => {
                let query =
                    Query::new(queries::LOGIN_PASSWORD, self.tr("Enter user password: ")).hidden();
                Secret::new(self.dialog.query_string(&query)?)
            }
        };
        self.log_filter.add(password.expose());

        tracing::info!("{}", self.tr("Executing login sequence..."));
        let invocation = self
            .tool
            .login_user(layout_dir, &self.profile.name, &user, password);
        let execution = self.executor.execute(&invocation)?;

        if execution.success() {
            tracing::info!("Login sequence executed successfully");
        } else {
            tracing::error!("{}", self.tr("Login sequence failed"));
        }

        Ok(self.report(
            "Login output:",
            &execution,
            &[
                "Please make sure that user details are correct and group membership meets expectations (search for PrincipalRecord and GroupRecord titles).",
                "Abort if output is incorrect.",
            ],
        ))
    }
}
