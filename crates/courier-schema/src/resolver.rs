//! The immutable, queryable index over a set of schema files.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::extend::Extend;
use crate::file::SchemaFile;
use crate::service::Service;
use crate::ty::{Message, Type};
use crate::url::DeclarationUrl;

/// Errors detected while building a [`SchemaResolver`].
///
/// Build failures are fatal to startup: a server must not come up over a
/// colliding or malformed schema set.
#[derive(Debug, Error)]
pub enum SchemaResolutionError {
    /// Two declarations claim the same URL.
    #[error("declaration URL collision: {url}")]
    UrlCollision {
        /// The URL claimed twice.
        url: DeclarationUrl,
    },

    /// A field carries the reserved tag zero.
    #[error("field '{field}' of {message} has tag 0; tags must be positive")]
    ZeroTag {
        /// URL of the owning message or extension block.
        message: DeclarationUrl,
        /// Name of the offending field.
        field: String,
    },

    /// Two fields of one message share a tag.
    #[error("duplicate tag {tag} in {message}")]
    DuplicateTag {
        /// URL of the owning message or extension block.
        message: DeclarationUrl,
        /// The tag claimed twice.
        tag: u32,
    },

    /// Two files in the set share a name.
    #[error("duplicate schema file: {name}")]
    DuplicateFile {
        /// The file name appearing twice.
        name: String,
    },
}

/// A resolved declaration, borrowed from the resolver's index.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'resolver> {
    /// The URL names a type.
    Type(&'resolver Type),
    /// The URL names a service.
    Service(&'resolver Service),
    /// The URL names an extension block.
    Extend(&'resolver Extend),
}

/// Immutable snapshot over a complete set of schema files.
///
/// Built once, then only read: the resolver is safe to share across
/// concurrent callers behind an [`Arc`] without locking. It performs no
/// network or disk I/O; the file set is already in memory.
#[derive(Debug, Default)]
pub struct SchemaResolver {
    files: Vec<Arc<SchemaFile>>,
    types: HashMap<DeclarationUrl, Arc<Type>>,
    services: HashMap<DeclarationUrl, Arc<Service>>,
    extends: HashMap<DeclarationUrl, Arc<Extend>>,
}

impl SchemaResolver {
    /// Builds a resolver from a complete file set.
    ///
    /// Declarations are indexed recursively, including types and extension
    /// blocks nested inside messages and enclosing namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaResolutionError`] when two declarations collide on a
    /// URL, when two files share a name, or when a message or extension
    /// block carries zero or duplicate field tags.
    pub fn build(
        files: impl IntoIterator<Item = SchemaFile>,
    ) -> Result<Self, SchemaResolutionError> {
        let mut resolver = Self::default();
        let mut claimed = HashSet::new();
        let mut file_names = HashSet::new();

        for file in files {
            if !file_names.insert(file.name.clone()) {
                return Err(SchemaResolutionError::DuplicateFile { name: file.name });
            }
            for service in &file.services {
                claim(&mut claimed, &service.url)?;
                resolver
                    .services
                    .insert(service.url.clone(), Arc::new(service.clone()));
            }
            for ty in &file.types {
                resolver.index_type(&mut claimed, ty)?;
            }
            for extend in &file.extends {
                resolver.index_extend(&mut claimed, extend)?;
            }
            resolver.files.push(Arc::new(file));
        }

        Ok(resolver)
    }

    fn index_type(
        &mut self,
        claimed: &mut HashSet<DeclarationUrl>,
        ty: &Type,
    ) -> Result<(), SchemaResolutionError> {
        claim(claimed, ty.url())?;
        if let Type::Message(message) = ty {
            validate_message_tags(message)?;
        }
        self.types.insert(ty.url().clone(), Arc::new(ty.clone()));

        for nested in ty.nested_types() {
            self.index_type(claimed, nested)?;
        }
        for extend in ty.nested_extends() {
            self.index_extend(claimed, extend)?;
        }
        Ok(())
    }

    fn index_extend(
        &mut self,
        claimed: &mut HashSet<DeclarationUrl>,
        extend: &Extend,
    ) -> Result<(), SchemaResolutionError> {
        claim(claimed, &extend.url)?;
        validate_extend_tags(extend)?;
        self.extends
            .insert(extend.url.clone(), Arc::new(extend.clone()));
        Ok(())
    }

    /// Resolves a URL to whichever declaration claims it.
    #[must_use]
    pub fn resolve(&self, url: &DeclarationUrl) -> Option<Declaration<'_>> {
        if let Some(ty) = self.types.get(url) {
            return Some(Declaration::Type(ty));
        }
        if let Some(service) = self.services.get(url) {
            return Some(Declaration::Service(service));
        }
        self.extends.get(url).map(|extend| Declaration::Extend(extend))
    }

    /// Resolves a URL to a type declaration.
    #[must_use]
    pub fn resolve_type(&self, url: &DeclarationUrl) -> Option<&Type> {
        self.types.get(url).map(Arc::as_ref)
    }

    /// Resolves a URL to a service declaration.
    #[must_use]
    pub fn resolve_service(&self, url: &DeclarationUrl) -> Option<&Service> {
        self.services.get(url).map(Arc::as_ref)
    }

    /// Resolves a URL to an extension block.
    #[must_use]
    pub fn resolve_extend(&self, url: &DeclarationUrl) -> Option<&Extend> {
        self.extends.get(url).map(Arc::as_ref)
    }

    /// Enumerates the files whose package matches none of the excluded
    /// prefixes, in the order the files were supplied to [`Self::build`].
    ///
    /// Exclusion hides framework-internal packages from reflection
    /// consumers.
    pub fn files<'resolver>(
        &'resolver self,
        exclude_packages: &'resolver [String],
    ) -> impl Iterator<Item = &'resolver SchemaFile> {
        self.files
            .iter()
            .map(Arc::as_ref)
            .filter(move |file| !exclude_packages.iter().any(|prefix| file.package_matches(prefix)))
    }

    /// Enumerates all services in deterministic (file, declaration) order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.files
            .iter()
            .flat_map(|file| file.services.iter())
    }

    /// Returns the number of files in the snapshot.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn claim(
    claimed: &mut HashSet<DeclarationUrl>,
    url: &DeclarationUrl,
) -> Result<(), SchemaResolutionError> {
    if claimed.insert(url.clone()) {
        Ok(())
    } else {
        Err(SchemaResolutionError::UrlCollision { url: url.clone() })
    }
}

fn validate_message_tags(message: &Message) -> Result<(), SchemaResolutionError> {
    let mut seen = HashSet::new();
    for field in message.all_fields() {
        if field.tag == 0 {
            return Err(SchemaResolutionError::ZeroTag {
                message: message.url.clone(),
                field: field.name.clone(),
            });
        }
        if !seen.insert(field.tag) {
            return Err(SchemaResolutionError::DuplicateTag {
                message: message.url.clone(),
                tag: field.tag,
            });
        }
    }
    Ok(())
}

fn validate_extend_tags(extend: &Extend) -> Result<(), SchemaResolutionError> {
    let mut seen = HashSet::new();
    for field in &extend.fields {
        if field.tag == 0 {
            return Err(SchemaResolutionError::ZeroTag {
                message: extend.url.clone(),
                field: field.name.clone(),
            });
        }
        if !seen.insert(field.tag) {
            return Err(SchemaResolutionError::DuplicateTag {
                message: extend.url.clone(),
                tag: field.tag,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
