use std::future::Future;
use std::pin::Pin;

use crate::logic::error::ResolveError;
use crate::model::{
    EntityKind, EntityLinks, Id, Node, NodeGroup, ParamOwner, ResolvedParameter,
    ResolvedParameters, SourceRef,
};
use crate::store::traits::Store;

type MergeFuture<'a> = Pin<Box<dyn Future<Output = Result<ResolvedParameters, ResolveError>> + Send + 'a>>;

/// Effective parameter merging.
///
/// Precedence is "closest owner wins": an owner's own assignment always
/// beats anything inherited, and among several parents (or several direct
/// group memberships of a node) the one declared first wins for a key the
/// accumulator does not yet hold.
pub struct ParameterResolution;

impl ParameterResolution {
    /// Effective parameters of a group: its own assignments, then each
    /// immediate parent's effective set merged in declaration order,
    /// filling only missing keys. Recursion supplies transitivity.
    pub async fn for_group<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        group: &NodeGroup,
    ) -> Result<ResolvedParameters, ResolveError> {
        let mut path = vec![group.id];
        merge_group(store, links, group, &mut path).await
    }

    /// Effective parameters of a node: its own assignments win, then each
    /// direct group membership's effective set is merged first-wins. Only
    /// direct memberships are consulted here; the group merge already
    /// covers their ancestors.
    pub async fn for_node<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        node: &Node,
    ) -> Result<ResolvedParameters, ResolveError> {
        let source = SourceRef::new(EntityKind::Node, &node.name, links);
        let mut params = own_parameters(store, ParamOwner::Node, node.id, &source).await?;

        for group in store.groups_of_node(node.id).await? {
            let group_params = Self::for_group(store, links, &group).await?;
            for (key, param) in group_params {
                params.entry(key).or_insert(param);
            }
        }
        Ok(params)
    }
}

async fn own_parameters<S: Store>(
    store: &S,
    owner: ParamOwner,
    owner_id: Id,
    source: &SourceRef,
) -> Result<ResolvedParameters, ResolveError> {
    let mut params = ResolvedParameters::new();
    for param in store.parameters_of(owner, owner_id).await? {
        params.insert(
            param.key.clone(),
            ResolvedParameter {
                key: param.key,
                value: param.value,
                source: source.clone(),
            },
        );
    }
    Ok(params)
}

fn merge_group<'a, S: Store>(
    store: &'a S,
    links: &'a dyn EntityLinks,
    group: &'a NodeGroup,
    path: &'a mut Vec<Id>,
) -> MergeFuture<'a> {
    Box::pin(async move {
        let source = SourceRef::new(EntityKind::NodeGroup, &group.name, links);
        let mut params = own_parameters(store, ParamOwner::NodeGroup, group.id, &source).await?;

        for parent in store.parents_of_group(group.id).await? {
            if path.contains(&parent.id) {
                return Err(ResolveError::Cycle { group: parent.name });
            }
            path.push(parent.id);
            let parent_params = merge_group(store, links, &parent, path).await?;
            path.pop();

            for (key, param) in parent_params {
                params.entry(key).or_insert(param);
            }
        }
        Ok(params)
    })
}
