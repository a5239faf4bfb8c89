use std::sync::Arc;

use service_builder::{
    Dependencies, DynError, Provider, ProviderSpec, Registry, ResolveError, Resolved,
    ServiceFactory,
};

fn main() -> Result<(), DynError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut registry = Registry::new();
    registry
        .register("meat", ["meatStyle", "meatCut"], {
            Provider::sync(|deps| {
                let style = deps.get::<String>("meatStyle")?;
                let cut = deps.get::<String>("meatCut")?;
                Ok::<_, ResolveError>(format!("{style} {cut}"))
            })
        })?
        .register("juice", ["fruit"], {
            Provider::future(|deps| {
                let fruit = deps.get::<String>("fruit");
                async move { fruit.map(|fruit| format!("fresh {fruit}")) }
            })
        })?;
    registry.define([
        ("egg", ProviderSpec::value("scrambled".to_string())),
        ("breakfast", ProviderSpec::factory(BreakfastFactory)),
    ])?;

    let builder = registry.builder();
    println!("{:?}", builder.entry_points());

    let builder = builder
        .set("meatStyle", "grilled".to_string())
        .set("meatCut", "ham".to_string());
    println!("{:?}", builder.setters());

    // Still missing the fruit
    if let Err(e) = builder.get("breakfast") {
        println!("{e}");
    }

    let orange = builder.set_future("fruit", async { Ok::<_, DynError>("orange".to_string()) });
    let breakfast: Resolved = orange.get("breakfast")?;
    let breakfast = futures::executor::block_on(breakfast.wait_for::<Breakfast>())?;
    println!("{:?}", breakfast);

    Ok(())
}

#[derive(Debug)]
#[allow(dead_code)]
struct Breakfast {
    meat: Arc<String>,
    egg: Arc<String>,
    juice: Arc<String>,
}

struct BreakfastFactory;
impl ServiceFactory for BreakfastFactory {
    type Provides = Breakfast;
    type Error = ResolveError;

    fn dependencies(&self) -> Vec<String> {
        vec!["meat".into(), "egg".into(), "juice".into()]
    }

    fn construct(&self, deps: Dependencies) -> Result<Self::Provides, Self::Error> {
        Ok(Breakfast {
            meat: deps.get("meat")?,
            egg: deps.get("egg")?,
            juice: deps.get("juice")?,
        })
    }
}
