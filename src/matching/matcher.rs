//! Distributing instance children over declared children

use super::harvest::harvest;
use super::names::matching_rule;
use super::{Correspondence, DeclaredChild, InstanceChild, InstanceRef, MatchResult};
use crate::documents::InstanceNode;
use crate::error::Result;
use crate::navigator::DefinitionCursor;
use tracing::{debug, trace};

/// Match the children declared below the cursor's element against the
/// children of an instance node.
///
/// The cursor is restored before this returns; the only error is a cursor
/// that could not be restored.
pub fn match_children<'a, C, N>(definition: &mut C, instance: &'a N) -> Result<MatchResult<'a, C, N>>
where
    C: DefinitionCursor,
    N: InstanceNode,
{
    let declared = harvest(definition)?;
    Ok(match_declared(declared, instance))
}

/// Match already harvested declarations against the children of an instance node.
///
/// Declarations are served in order and each claims every still unclaimed
/// child whose name it describes. A value-constraint declaration claims no
/// child: it is paired with the node's own scalar value when that value is
/// present and non-empty.
pub fn match_declared<'a, C, N>(declared: Vec<DeclaredChild<C>>, instance: &'a N) -> MatchResult<'a, C, N>
where
    N: InstanceNode,
{
    let pool = instance.children();
    let mut claimed = vec![false; pool.len()];
    let mut matches = Vec::with_capacity(declared.len());

    for declared in declared {
        let mut instances = Vec::new();

        if declared.is_value_constraint() {
            if instance.value().is_some_and(|v| !v.is_empty()) {
                instances.push(InstanceRef::Value(instance));
            }
        } else {
            for (position, &node) in pool.iter().enumerate() {
                if claimed[position] {
                    continue;
                }
                if let Some(rule) = matching_rule(declared.path_name(), node.name(), node.type_name()) {
                    trace!(
                        declared = declared.path_name(),
                        instance = node.name(),
                        position,
                        ?rule,
                        "matched instance child"
                    );
                    claimed[position] = true;
                    instances.push(InstanceRef::Child(InstanceChild { position, node }));
                }
            }
        }

        matches.push(Correspondence { declared, instances });
    }

    let unmatched: Vec<InstanceChild<'a, N>> = pool
        .into_iter()
        .enumerate()
        .filter(|(position, _)| !claimed[*position])
        .map(|(position, node)| InstanceChild { position, node })
        .collect();

    debug!(
        instance = instance.name(),
        declarations = matches.len(),
        unmatched = unmatched.len(),
        "matched children"
    );

    MatchResult { matches, unmatched }
}
