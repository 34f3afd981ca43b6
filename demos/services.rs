use injecta::prelude::*;

struct Ref1 {
    f1: String,
}

#[derive(Construct)]
struct Service1 {
    ref1: Arc<Ref1>,
}

impl Service1 {
    fn describe(&self) -> String {
        format!("service1 sees f1 = {}", self.ref1.f1)
    }
}

struct Service2 {
    ref1: Arc<Ref1>,
}

#[factory(name = "service2")]
fn make_service2(ref1: Arc<Ref1>) -> Service2 {
    Service2 { ref1 }
}

#[factory]
async fn banner(service1: Arc<Service1>) -> String {
    format!("[{}]", service1.describe())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting services demo");

    // 1. Root container with a logger and the shared reference
    let container = ContainerBuilder::new()
        .logger(Arc::new(TracingLogger))
        .add_ref("ref1", Ref::value(Ref1 { f1: "Ok".into() }))
        .build();

    // 2. Constructor injection, a named factory, then an async one
    let container = container
        .register_with(Factory::constructor::<Service1>(), "service1")
        .register(make_service2_factory())
        .register(banner_factory())
        .await;

    let service1 = container.resolve::<Service1>("service1");
    let service2 = container.resolve::<Service2>("service2");
    let banner = container.resolve::<String>("banner");
    match (service1, service2, banner) {
        (Ok(service1), Ok(service2), Ok(banner)) => {
            tracing::info!("{}", service1.describe());
            tracing::info!("service2 sees f1 = {}", service2.ref1.f1);
            tracing::info!("{}", banner);
        }
        (service1, service2, banner) => {
            tracing::error!(
                "Registration incomplete: {:?} {:?} {:?}",
                service1.err(),
                service2.err(),
                banner.err()
            );
            return;
        }
    }

    // 3. Re-adding a swappable reference updates everyone holding it
    let held = container.get("ref1");
    container.add_ref("ref1", Ref::value(Ref1 { f1: "Updated".into() }), false);
    if let Some(ref1) = held.and_then(|entry| entry.downcast::<Ref1>()) {
        tracing::info!("held ref1 now reads f1 = {}", ref1.f1);
    }

    // 4. A child container shadows without touching the root
    let child = container.clone_with(Some(
        Deps::new().with("ref1", Ref::value(Ref1 { f1: "Child".into() })),
    ));
    let _ = child.register(make_service2_factory());
    if let Ok(service2) = child.resolve::<Service2>("service2") {
        tracing::info!("child service2 sees f1 = {}", service2.ref1.f1);
    }

    tracing::info!("Registered names: {:?}", container.names());
}
