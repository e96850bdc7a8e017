//! Resolution model selection.
//!
//! A deployment resolves handler ids through exactly one of two models:
//!
//! - [`ResolutionModel::Chain`]: an [`ExtensionChain`], consulted newest-first.
//! - [`ResolutionModel::Registry`]: a [`HandlerRegistry`], exact id lookup.
//!
//! [`Resolution`] owns whichever was selected, seeded with the built-in
//! handlers, and refuses registrations meant for the other model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builtin::{self, StandardExtension};
use crate::chain::ExtensionChain;
use crate::context::ResolutionContext;
use crate::error::{RegistrationError, RegistrationResult};
use crate::registry::HandlerRegistry;
use crate::resolver::{Extension, HandlerSource, Resolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionModel {
    /// Pull model: layered extensions.
    #[default]
    Chain,
    /// Push model: one resolver per handler id.
    Registry,
}

impl ResolutionModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Registry => "registry",
        }
    }
}

impl fmt::Display for ResolutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chain" => Ok(Self::Chain),
            "registry" => Ok(Self::Registry),
            other => Err(format!("unknown resolution model '{other}'")),
        }
    }
}

/// The active resolution source of a deployment.
#[derive(Debug)]
pub enum Resolution {
    Chain(ExtensionChain),
    Registry(HandlerRegistry),
}

impl Resolution {
    /// Creates the source for `model` with the built-in handlers in place.
    pub fn new(model: ResolutionModel) -> Self {
        match model {
            ResolutionModel::Chain => {
                let chain = ExtensionChain::new();
                chain.register_extension(StandardExtension);
                Self::Chain(chain)
            }
            ResolutionModel::Registry => {
                let registry = HandlerRegistry::new();
                builtin::register_handlers(&registry);
                Self::Registry(registry)
            }
        }
    }

    pub fn model(&self) -> ResolutionModel {
        match self {
            Self::Chain(_) => ResolutionModel::Chain,
            Self::Registry(_) => ResolutionModel::Registry,
        }
    }

    /// Adds an extension on top of the chain.
    pub fn register_extension<E>(&self, extension: E) -> RegistrationResult<()>
    where
        E: Extension + 'static,
    {
        match self {
            Self::Chain(chain) => {
                chain.register_extension(extension);
                Ok(())
            }
            Self::Registry(_) => Err(RegistrationError::WrongModel {
                kind: "extension",
                model: self.model(),
            }),
        }
    }

    /// Binds a resolver to `id` in the registry.
    pub fn register_handler<R>(&self, id: impl Into<String>, resolver: R) -> RegistrationResult<()>
    where
        R: Resolver + 'static,
    {
        match self {
            Self::Registry(registry) => registry.register(id, resolver),
            Self::Chain(_) => Err(RegistrationError::WrongModel {
                kind: "handler",
                model: self.model(),
            }),
        }
    }

    /// Extension names in consultation order; empty in registry mode.
    pub fn extension_names(&self) -> Vec<String> {
        match self {
            Self::Chain(chain) => chain.extension_names(),
            Self::Registry(_) => Vec::new(),
        }
    }
}

impl HandlerSource for Resolution {
    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        match self {
            Self::Chain(chain) => chain.resolve(handler, ctx),
            Self::Registry(registry) => registry.resolve(handler, ctx),
        }
    }

    fn handler_ids(&self) -> BTreeSet<String> {
        match self {
            Self::Chain(chain) => chain.list_ids(),
            Self::Registry(registry) => registry.list_ids(),
        }
    }

    fn contains(&self, handler: &str) -> bool {
        match self {
            Self::Chain(chain) => chain.contains(handler),
            Self::Registry(registry) => registry.contains(handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::builtin::BUILTIN_IDS;
    use crate::context::Player;

    struct Upper;

    impl Extension for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn provides(&self) -> Vec<&str> {
            vec!["upper:name"]
        }

        fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
            (handler == "upper:name").then(|| ctx.name().to_uppercase())
        }
    }

    fn admin_ctx() -> ResolutionContext {
        ResolutionContext::new(Arc::new(Player::new("1", "Ann").with_admin(true)))
    }

    #[test]
    fn test_both_models_seed_builtins() {
        for model in [ResolutionModel::Chain, ResolutionModel::Registry] {
            let resolution = Resolution::new(model);
            assert_eq!(resolution.model(), model);
            for id in BUILTIN_IDS {
                assert!(resolution.contains(id), "{model}: {id}");
                assert!(resolution.resolve(id, &admin_ctx()).is_some(), "{model}: {id}");
            }
        }
    }

    #[test]
    fn test_chain_rejects_handlers() {
        let resolution = Resolution::new(ResolutionModel::Chain);
        let err = resolution
            .register_handler("x", |_: &ResolutionContext| None::<String>)
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::WrongModel {
                kind: "handler",
                model: ResolutionModel::Chain
            }
        );

        resolution.register_extension(Upper).unwrap();
        assert_eq!(resolution.resolve("upper:name", &admin_ctx()), Some("ANN".into()));
        assert_eq!(resolution.extension_names(), vec!["upper", StandardExtension::NAME]);
    }

    #[test]
    fn test_registry_rejects_extensions() {
        let resolution = Resolution::new(ResolutionModel::Registry);
        assert!(matches!(
            resolution.register_extension(Upper),
            Err(RegistrationError::WrongModel { kind: "extension", .. })
        ));

        resolution
            .register_handler("x", |_: &ResolutionContext| Some("y".to_string()))
            .unwrap();
        assert!(resolution.handler_ids().contains("x"));
        assert!(resolution.extension_names().is_empty());
    }

    #[test]
    fn test_model_parse_and_serde() {
        assert_eq!("Registry".parse::<ResolutionModel>(), Ok(ResolutionModel::Registry));
        assert!("both".parse::<ResolutionModel>().is_err());
        assert_eq!(
            serde_json::to_string(&ResolutionModel::Chain).unwrap(),
            "\"chain\""
        );
        assert_eq!(ResolutionModel::default(), ResolutionModel::Chain);
    }
}
