use proc_macro::TokenStream;

mod attrs;
mod construct;
mod factory;

/// Derive macro for types the container can instantiate
///
/// Every named field is a dependency, named after the field unless renamed
/// with `#[inject(name = "...")]`. Field types are converted with `FromArg`.
///
/// # Example
/// ```ignore
/// use injecta::{Construct, Entry};
/// use std::sync::Arc;
///
/// #[derive(Construct)]
/// pub struct UserService {
///     repository: Entry,
///     #[inject(name = "app_name")]
///     name: Arc<String>,
/// }
/// ```
#[proc_macro_derive(Construct, attributes(inject))]
pub fn derive_construct(input: TokenStream) -> TokenStream {
    construct::derive_construct(input)
}

/// Attribute macro turning a function into a container factory
///
/// Generates `<fn>_factory()` returning an `injecta::Factory` whose
/// dependencies are the function's parameter names. `async fn` factories
/// become pending factories.
///
/// # Example
/// ```ignore
/// use injecta::{factory, Entry};
///
/// #[factory(name = "service2")]
/// fn make_service(ref1: Entry) -> Service {
///     Service::new(ref1)
/// }
///
/// container.register(make_service_factory());
/// ```
#[proc_macro_attribute]
pub fn factory(attr: TokenStream, item: TokenStream) -> TokenStream {
    factory::factory_attribute(attr, item)
}
