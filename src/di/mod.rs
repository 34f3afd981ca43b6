mod builder;
mod container;
mod entry;
mod factory;
mod inject;
pub mod introspect;
mod register;
mod value;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use entry::Entry;
pub use factory::{
    Components, Construct, Factory, FactoryKind, IntoProduced, Pending, PendingFuture, Produced,
    Provided,
};
pub use inject::{resolve, Args, FromArg};
pub use register::{PendingRegistration, RegisterOptions, Registration};
pub use value::{Deps, Ref, Value};
