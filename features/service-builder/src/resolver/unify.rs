use futures::future::try_join_all;

use crate::{
    errors::ResolveError,
    registry::ServiceDefinition,
    resolver::{Dependencies, Resolver},
    types::Resolved,
};

/// Runs the provider of `definition` once all `values` are available
///
/// If every value is ready the provider runs right away. Otherwise all pending
/// values are awaited together, and the result is pending as well. The provider
/// never runs if one of them fails, the first failure rejects the result.
///
/// The pending result only holds a weak handle on `resolver`, as it is memoized
/// in that resolver's own state.
pub(crate) fn unify(
    definition: &ServiceDefinition,
    values: Vec<(String, Resolved)>,
    resolver: &Resolver,
) -> Result<Resolved, ResolveError> {
    let service = definition.name().to_string();
    let provider = definition.provider().clone();

    if !values.iter().any(|(_, value)| value.is_pending()) {
        let ready = values
            .into_iter()
            .filter_map(|(name, value)| Some((name, value.into_ready()?)))
            .collect();

        return provider.provide(Dependencies::new(service, ready, resolver.downgrade()));
    }

    tracing::trace!("{service} is waiting on pending dependencies");
    let (names, values): (Vec<_>, Vec<_>) = values.into_iter().unzip();
    let weak = resolver.downgrade();

    Ok(Resolved::from_future(async move {
        let settled = try_join_all(values.into_iter().map(Resolved::wait)).await?;
        let deps = Dependencies::new(
            service.clone(),
            names.into_iter().zip(settled).collect(),
            weak.clone(),
        );

        let provided = weak
            .upgrade()
            .providing(&service, || provider.provide(deps))?;
        provided.wait().await
    }))
}
