// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User and privilege management.

use crate::client::Client;
use crate::error::{InflowError, Result};
use crate::policy::UserPrivilege;
use crate::query::QueryResult;

/// User administration statements, run without a database.
pub struct Admin<'a> {
    client: &'a Client,
}

impl<'a> Admin<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create `username`. Only [`UserPrivilege::All`] can be given at
    /// creation; grant database privileges afterwards with [`Admin::grant`].
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        privilege: Option<UserPrivilege>,
    ) -> Result<QueryResult> {
        let mut command = format!(
            "CREATE USER {} WITH PASSWORD '{}'",
            username,
            escape_password(password)
        );
        match privilege {
            None => {}
            Some(UserPrivilege::All) => command.push_str(" WITH ALL PRIVILEGES"),
            Some(other) => {
                return Err(InflowError::InvalidArgument(format!(
                    "{} privileges cannot be set at user creation, grant them on a database",
                    other
                )));
            }
        }
        self.run(&command)
    }

    pub fn drop_user(&self, username: &str) -> Result<QueryResult> {
        self.run(&format!("DROP USER {}", username))
    }

    pub fn change_user_password(&self, username: &str, password: &str) -> Result<QueryResult> {
        self.run(&format!(
            "SET PASSWORD FOR {} = '{}'",
            username,
            escape_password(password)
        ))
    }

    pub fn show_users(&self) -> Result<QueryResult> {
        self.run("SHOW USERS")
    }

    /// Grant `privilege` on `database`, or cluster-wide when `database` is None.
    pub fn grant(
        &self,
        privilege: UserPrivilege,
        username: &str,
        database: Option<&str>,
    ) -> Result<QueryResult> {
        self.run(&privilege_statement("GRANT", "TO", privilege, username, database)?)
    }

    /// Revoke `privilege` on `database`, or cluster-wide when `database` is None.
    pub fn revoke(
        &self,
        privilege: UserPrivilege,
        username: &str,
        database: Option<&str>,
    ) -> Result<QueryResult> {
        self.run(&privilege_statement("REVOKE", "FROM", privilege, username, database)?)
    }

    fn run(&self, command: &str) -> Result<QueryResult> {
        log::debug!("[client] admin: {}", command.split('\'').next().unwrap_or(command));
        self.client.query(None, command)
    }
}

/// `GRANT ALL PRIVILEGES TO bob`, `REVOKE READ ON db FROM bob`.
fn privilege_statement(
    verb: &str,
    preposition: &str,
    privilege: UserPrivilege,
    username: &str,
    database: Option<&str>,
) -> Result<String> {
    match database {
        Some(db) => Ok(format!(
            "{} {} ON {} {} {}",
            verb, privilege, db, preposition, username
        )),
        None if privilege == UserPrivilege::All => Ok(format!(
            "{} ALL PRIVILEGES {} {}",
            verb, preposition, username
        )),
        None => Err(InflowError::InvalidArgument(format!(
            "only ALL privileges can be granted or revoked cluster-wide, not {}",
            privilege
        ))),
    }
}

fn escape_password(password: &str) -> String {
    password.replace('\\', "\\\\").replace('\'', "\\'")
}
