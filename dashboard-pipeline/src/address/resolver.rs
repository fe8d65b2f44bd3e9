use parking_lot::RwLock;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AddressNode, AddressTree, LocationRef};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Subscribers that fall this far behind only see the latest locations
const LOCATION_CHANNEL_CAPACITY: usize = 16;

/// Snapshot of the current selection and the options each level offers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSelection {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub level2_options: Vec<String>,
    pub level3_options: Vec<String>,
    /// Deepest selected node that carries coordinates
    pub location: Option<LocationRef>,
}

impl AddressSelection {
    /// Selected names from level 1 down
    pub fn path(&self) -> Vec<&str> {
        [&self.level1, &self.level2, &self.level3]
            .into_iter()
            .map_while(|level| level.as_deref())
            .collect()
    }
}

/// Resolves a 3-level address selection against the address tree
///
/// Every operation computes the complete next selection first and commits it
/// in one step, so a failed lookup leaves the previous selection (and its
/// `LocationRef`) untouched. Each successful operation publishes exactly one
/// `LocationRef`: the deepest one of the new selection.
pub struct AddressHierarchyResolver {
    tree: Arc<AddressTree>,
    selection: RwLock<AddressSelection>,
    location_tx: broadcast::Sender<LocationRef>,
}

impl AddressHierarchyResolver {
    pub fn new(tree: Arc<AddressTree>) -> Self {
        let (location_tx, _) = broadcast::channel(LOCATION_CHANNEL_CAPACITY);
        Self {
            tree,
            selection: RwLock::new(AddressSelection::default()),
            location_tx,
        }
    }

    pub fn tree(&self) -> &AddressTree {
        &self.tree
    }

    /// Receive every published `LocationRef`
    pub fn subscribe(&self) -> broadcast::Receiver<LocationRef> {
        self.location_tx.subscribe()
    }

    /// Province names in source order
    pub fn level1_options(&self) -> Vec<String> {
        self.tree.level1_options()
    }

    pub fn selection(&self) -> AddressSelection {
        self.selection.read().clone()
    }

    pub fn location(&self) -> Option<LocationRef> {
        self.selection.read().location
    }

    /// Select a province
    ///
    /// A different province resets levels 2 and 3. Re-selecting the current
    /// province keeps the lower levels while they are still valid.
    pub fn select_level1(&self, name: &str) -> AppResult<AddressSelection> {
        self.commit(|current| {
            let (hint2, hint3) = if current.level1.as_deref() == Some(name) {
                (current.level2.clone(), current.level3.clone())
            } else {
                (None, None)
            };
            build_selection(&self.tree, name, hint2.as_deref(), hint3.as_deref())
        })
    }

    /// Select a city under the current province
    ///
    /// A different city resets level 3 to its first district.
    pub fn select_level2(&self, name: &str) -> AppResult<AddressSelection> {
        self.commit(|current| {
            let level1 = current
                .level1
                .clone()
                .ok_or_else(|| parent_missing("level1", name))?;
            let parent = self.node(&[level1.as_str()])?;
            if parent.child(name).is_none() {
                return Err(AppError::address_not_found(&[level1.as_str(), name]));
            }
            let hint3 = if current.level2.as_deref() == Some(name) {
                current.level3.clone()
            } else {
                None
            };
            build_selection(&self.tree, &level1, Some(name), hint3.as_deref())
        })
    }

    /// Select a district under the current city
    pub fn select_level3(&self, name: &str) -> AppResult<AddressSelection> {
        self.commit(|current| {
            let (Some(level1), Some(level2)) = (current.level1.clone(), current.level2.clone())
            else {
                return Err(parent_missing("level2", name));
            };
            let parent = self.node(&[level1.as_str(), level2.as_str()])?;
            if parent.child(name).is_none() {
                return Err(AppError::address_not_found(&[
                    level1.as_str(),
                    level2.as_str(),
                    name,
                ]));
            }
            build_selection(&self.tree, &level1, Some(&level2), Some(name))
        })
    }

    /// Select a whole path at once (e.g. the configured default)
    ///
    /// Every given level must exist; omitted lower levels default to the
    /// first child.
    pub fn select_path(
        &self,
        level1: &str,
        level2: Option<&str>,
        level3: Option<&str>,
    ) -> AppResult<AddressSelection> {
        self.commit(|_| {
            if level2.is_none()
                && let Some(name) = level3
            {
                return Err(parent_missing("level2", name));
            }
            let mut path = vec![level1];
            path.extend(level2);
            path.extend(level3);
            self.node(&path)?;
            build_selection(&self.tree, level1, level2, level3)
        })
    }

    fn node(&self, path: &[&str]) -> AppResult<&AddressNode> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| AppError::validation("empty address path"))?;
        let mut node = self
            .tree
            .get(first)
            .ok_or_else(|| AppError::address_not_found(&path[..1]))?;
        for (depth, name) in rest.iter().enumerate() {
            node = node
                .child(name)
                .ok_or_else(|| AppError::address_not_found(&path[..depth + 2]))?;
        }
        Ok(node)
    }

    fn commit<F>(&self, next: F) -> AppResult<AddressSelection>
    where
        F: FnOnce(&AddressSelection) -> AppResult<AddressSelection>,
    {
        let mut guard = self.selection.write();
        let selection = match next(&*guard) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!(error = %e, "Address selection rejected, keeping previous");
                return Err(e);
            }
        };
        *guard = selection.clone();

        // Published under the guard so subscribers see commits in order
        if let Some(location) = selection.location {
            // No receivers is fine; the selection is still committed
            let _ = self.location_tx.send(location);
        }
        drop(guard);

        tracing::debug!(path = ?selection.path(), "Address selection resolved");
        Ok(selection)
    }
}

fn parent_missing(parent: &str, name: &str) -> AppError {
    AppError::with_message(
        ErrorCode::AddressParentMissing,
        format!("cannot select {} before {}", name, parent),
    )
    .with_detail("parent", parent)
}

/// Pick `wanted` among the children if present, else the first child
fn descend<'a>(node: &'a AddressNode, wanted: Option<&str>) -> Option<(&'a str, &'a AddressNode)> {
    wanted
        .and_then(|name| {
            node.children()
                .iter()
                .find(|(key, _)| key == name)
                .map(|(key, child)| (key.as_str(), child))
        })
        .or_else(|| node.first_child())
}

/// Build the full selection below `level1`, defaulting each missing or
/// stale lower level to the first child in source order
fn build_selection(
    tree: &AddressTree,
    level1: &str,
    hint2: Option<&str>,
    hint3: Option<&str>,
) -> AppResult<AddressSelection> {
    let node1 = tree
        .get(level1)
        .ok_or_else(|| AppError::address_not_found(&[level1]))?;

    let mut selection = AddressSelection {
        level1: Some(level1.to_string()),
        location: node1.location(),
        ..Default::default()
    };

    let Some((name2, node2)) = descend(node1, hint2) else {
        return Ok(selection);
    };
    selection.level2_options = node1.child_names();
    selection.level2 = Some(name2.to_string());
    selection.location = node2.location().or(selection.location);

    let Some((name3, node3)) = descend(node2, hint3) else {
        return Ok(selection);
    };
    selection.level3_options = node2.child_names();
    selection.level3 = Some(name3.to_string());
    selection.location = node3.location().or(selection.location);

    Ok(selection)
}
