//! Opening the engine over a workspace's files

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::config::load_config;
use crate::engine::{BordereauEvent, ChannelEventSink, LogEventSink, SignatureEngine};
use crate::errors::Result;
use crate::fs::{find_workspace_root, get_store_path, read_directory, resolve_cwd};
use crate::identity::InMemoryDirectory;
use crate::schemas::BordereauId;
use crate::store::JsonFileStore;

/// Engine backed by the workspace's JSON store
pub type WorkspaceEngine = SignatureEngine<JsonFileStore>;

/// Locate the workspace from `cwd` (or the process directory).
pub fn workspace_root(cwd: Option<&Path>) -> Result<PathBuf> {
    find_workspace_root(&resolve_cwd(cwd))
}

/// Build an engine from the workspace's store, directory and config.
pub fn open_engine(cwd: Option<&Path>) -> Result<WorkspaceEngine> {
    let root = workspace_root(cwd)?;
    let config = load_config(&root)?;
    let directory = InMemoryDirectory::from_snapshot(read_directory(&root)?);
    let store = JsonFileStore::new(get_store_path(&root));
    debug!(root = %root.display(), "opened workspace");

    Ok(SignatureEngine::new(store, directory)
        .with_config(config)
        .with_sink(LogEventSink))
}

/// Build an engine whose events are also delivered to the returned receiver.
pub fn open_engine_with_events(
    cwd: Option<&Path>,
) -> Result<(WorkspaceEngine, UnboundedReceiver<BordereauEvent>)> {
    let (sink, receiver) = ChannelEventSink::channel();
    Ok((open_engine(cwd)?.with_sink(sink), receiver))
}

/// Describe the status changes a call caused on documents other than `id`.
pub fn linked_changes(
    receiver: &mut UnboundedReceiver<BordereauEvent>,
    id: &BordereauId,
) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        let BordereauEvent::StatusChanged {
            id: changed,
            previous,
            status,
        } = event;
        if &changed != id {
            lines.push(format!("{}: {} -> {}", changed, previous, status));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Subtype, UserId};
    use crate::test_support::{
        make_asbestos, make_workspace, signed_through_operation, with_accepted_operation,
        PRODUCER_USER,
    };

    #[test]
    fn test_linked_changes_skip_the_requested_document() {
        let mut member = signed_through_operation(with_accepted_operation(
            make_asbestos("BSDA-1"),
            "R 13",
            None,
        ));
        member.links.grouped_into = Some(BordereauId::from("BSDA-G"));
        let group = make_asbestos("BSDA-G").with_subtype(Subtype::Grouping);
        let workspace = make_workspace(vec![member, group]);

        let (engine, mut events) = open_engine_with_events(Some(workspace.path())).unwrap();
        let group_id = BordereauId::from("BSDA-G");
        engine.delete(&group_id, &UserId::from(PRODUCER_USER)).unwrap();

        assert_eq!(
            linked_changes(&mut events, &group_id),
            vec!["BSDA-1: AWAITING_CHILD -> AWAITING_CHILD".to_string()]
        );
        assert!(linked_changes(&mut events, &group_id).is_empty());
    }
}
