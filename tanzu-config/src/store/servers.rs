//! Legacy server operations.

use crate::config::{ConfigValidator, Server};
use crate::error::{Error, Result};

use super::ConfigStore;

impl ConfigStore {
    /// Returns a copy of the server named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such server exists.
    pub fn get_server(&self, name: &str) -> Result<Server> {
        self.read(|doc, engine| {
            engine
                .lookup_server(doc, name)
                .ok_or_else(|| Error::not_found(format!("server {name}")))
        })
    }

    /// Inserts or updates a server, optionally making it current.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the server is invalid.
    pub fn set_server(&self, server: &Server, set_current: bool) -> Result<()> {
        ConfigValidator::validate_server(server)?;

        self.update(|doc, engine| {
            engine.upsert_server(doc, server, set_current);
            Ok(())
        })?;

        log::debug!("stored server '{}' ({})", server.name, server.kind);
        Ok(())
    }

    /// Deletes a server, clearing the current pointer if it referenced it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such server exists.
    pub fn delete_server(&self, name: &str) -> Result<()> {
        self.update(|doc, engine| {
            if engine.remove_server(doc, name) {
                Ok(())
            } else {
                Err(Error::not_found(format!("server {name}")))
            }
        })?;

        log::debug!("deleted server '{name}'");
        Ok(())
    }

    /// Returns the current server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no server is current or the pointer
    /// does not resolve.
    pub fn get_current_server(&self) -> Result<Server> {
        self.read(|doc, engine| {
            let name = engine
                .current_server_name(doc)
                .ok_or_else(|| Error::not_found("current server"))?;

            engine
                .lookup_server(doc, &name)
                .ok_or_else(|| Error::not_found(format!("server {name}")))
        })
    }

    /// Makes an existing server current.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such server exists.
    pub fn set_current_server(&self, name: &str) -> Result<()> {
        self.update(|doc, engine| {
            let server = engine
                .lookup_server(doc, name)
                .ok_or_else(|| Error::not_found(format!("server {name}")))?;
            engine.upsert_server(doc, &server, true);
            Ok(())
        })
    }

    /// Clears the current server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no server is current.
    pub fn remove_current_server(&self) -> Result<()> {
        self.update(|doc, engine| {
            if engine.clear_current_server(doc) {
                Ok(())
            } else {
                Err(Error::not_found("current server"))
            }
        })
    }

    /// Returns copies of all servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn get_all_servers(&self) -> Result<Vec<Server>> {
        self.read(|doc, engine| Ok(engine.all_servers(doc)))
    }

    /// Whether a server named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn server_exists(&self, name: &str) -> Result<bool> {
        self.read(|doc, engine| Ok(engine.lookup_server(doc, name).is_some()))
    }
}
