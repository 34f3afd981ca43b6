use injecta::{
    Args, Components, Container, ContainerBuilder, ContainerConfig, Deps, Factory, Module,
    Produced, Ref, Registration,
};
use std::sync::Arc;

struct Settings {
    url: String,
}

struct Pool {
    url: String,
}

struct Repository {
    pool: Arc<Pool>,
    table: Arc<String>,
}

struct Infrastructure;

impl Module for Infrastructure {
    fn register(&self, container: &Container) -> Registration {
        container.register(
            Factory::function("pool", |args: &Args| {
                let settings = args.value::<Settings>(0)?;
                Some(Produced::pending(async move {
                    tokio::task::yield_now().await;
                    anyhow::Ok(Produced::value(Pool {
                        url: settings.url.clone(),
                    }))
                }))
            })
            .with_signature("fn pool(settings: Arc<Settings>)"),
        )
    }
}

struct Repositories;

impl Module for Repositories {
    fn register(&self, container: &Container) -> Registration {
        container.register(
            Factory::function("repository", |args: &Args| {
                Some(Produced::value(Repository {
                    pool: args.value::<Pool>(0)?,
                    table: args.value::<String>(1)?,
                }))
            })
            .with_dependencies(["pool", "table"]),
        )
    }
}

fn root() -> Container {
    ContainerBuilder::new()
        .add_ref(
            "settings",
            Ref::value(Settings {
                url: "postgres://localhost".into(),
            }),
        )
        .add_ref("table", "users")
        .build()
}

#[tokio::test]
async fn test_modules_settle_in_order() {
    let container = root();
    let modules: Vec<Box<dyn Module + Send>> = vec![Box::new(Infrastructure), Box::new(Repositories)];

    let registration = container.install_all(modules);
    assert!(registration.is_pending());
    let settled = registration.await;

    assert!(settled.ptr_eq(&container));
    let repository = container.resolve::<Repository>("repository").unwrap();
    assert_eq!(repository.pool.url, "postgres://localhost");
    assert_eq!(repository.table.as_str(), "users");
}

#[tokio::test]
async fn test_child_overrides_stay_local() {
    let container = root();
    container.install(&Infrastructure).await;

    let child = container.clone_with(Some(Deps::new().with("table", "audit")));
    let _ = child.install(&Repositories);

    assert_eq!(
        child.resolve::<Repository>("repository").unwrap().table.as_str(),
        "audit"
    );
    assert!(!container.contains("repository"));
    assert_eq!(*container.resolve::<String>("table").unwrap(), "users");
    assert!(child.resolve::<Pool>("pool").is_ok());
}

#[test]
fn test_swap_reaches_child_holders() {
    let container = root();
    let child = container.child();
    let held = child.get("table").unwrap();

    container.add_ref("table", "accounts", false);
    assert_eq!(*held.downcast::<String>().unwrap(), "accounts");
    assert_eq!(*child.resolve::<String>("table").unwrap(), "accounts");
}

#[test]
fn test_bundle_then_dependent() {
    let container = Container::new();
    let registration = container
        .register(Components::new().with("host", "db").with("port", Ref::value(5432u16)))
        .register(
            Factory::function("address", |args: &Args| {
                let host = args.value::<String>(0)?;
                let port = args.value::<u16>(1)?;
                Some(Produced::value(format!("{host}:{port}")))
            })
            .with_signature("fn address(host, port)"),
        );

    assert!(registration.ready().is_some());
    assert_eq!(*container.resolve::<String>("address").unwrap(), "db:5432");
}

#[test]
fn test_custom_container_key() {
    let config = ContainerConfig::default().container_key("di");
    let container = ContainerBuilder::new().config(config).build();
    container.add_ref("marker", "present", false);

    let _ = container.register(
        Factory::function("probe", |args: &Args| {
            let di = args.container(0)?;
            Some(Produced::value(di.contains("marker")))
        })
        .with_dependencies(["di"]),
    );
    assert!(*container.resolve::<bool>("probe").unwrap());
}
