//! Controllers and the registry that builds them

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::app::App;
use crate::error::Failure;

/// A group of related handlers sharing state built once per app
///
/// # Example
///
/// ```rust
/// use quill_core::app::App;
/// use quill_core::error::Failure;
/// use quill_core::pipeline::{Controller, Handler, RequestContext};
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Controller for Greeter {
///     fn create(app: &App) -> Self {
///         let greeting = app.setting("greeting").and_then(|v| v.as_str()).unwrap_or("Hello");
///         Greeter { greeting: greeting.to_string() }
///     }
/// }
///
/// impl Greeter {
///     fn index(&self, _cx: &mut RequestContext<'_>) -> Result<String, Failure> {
///         Ok(format!("{}, world", self.greeting))
///     }
/// }
///
/// let handler = Handler::action(Greeter::index);
/// assert!(handler.controller().unwrap().ends_with("Greeter"));
/// ```
pub trait Controller: Send + Sync + 'static {
    fn create(app: &App) -> Self
    where
        Self: Sized;
}

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&App) -> Instance + Send + Sync>;

/// Controller factories plus the instances they already built
///
/// Types without an explicit factory are built with [`Controller::create`].
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<TypeId, Factory>,
    instances: RwLock<HashMap<TypeId, Instance>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace how `C` is constructed
    pub fn register<C, F>(&mut self, factory: F)
    where
        C: Controller,
        F: Fn(&App) -> C + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |app: &App| Arc::new(factory(app)) as Instance);
        self.factories.insert(TypeId::of::<C>(), factory);
    }

    /// Cached instance of `C`, built on first use
    pub fn resolve<C: Controller>(&self, app: &App) -> Result<Arc<C>, Failure> {
        let key = TypeId::of::<C>();

        let cached = self.read()?.get(&key).cloned();
        let instance = match cached {
            Some(instance) => instance,
            None => {
                let built = match self.factories.get(&key) {
                    Some(factory) => factory(app),
                    None => Arc::new(C::create(app)) as Instance,
                };
                log::debug!("Created controller {}", std::any::type_name::<C>());
                let mut instances = self
                    .instances
                    .write()
                    .map_err(|_| anyhow::anyhow!("controller registry lock poisoned"))?;
                Arc::clone(instances.entry(key).or_insert(built))
            }
        };

        instance.downcast::<C>().map_err(|_| {
            Failure::Internal(anyhow::anyhow!(
                "controller registry holds the wrong type for {}",
                std::any::type_name::<C>()
            ))
        })
    }

    /// Number of controllers built so far
    pub fn len(&self) -> usize {
        self.read().map(|instances| instances.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<TypeId, Instance>>, Failure> {
        self.instances
            .read()
            .map_err(|_| Failure::Internal(anyhow::anyhow!("controller registry lock poisoned")))
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("factories", &self.factories.len())
            .field("instances", &self.len())
            .finish()
    }
}
