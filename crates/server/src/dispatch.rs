//! Maps one decoded request to the node operation that answers it.

use crate::node::KvNode;
use corelib::node::NodeId;
use streaming::{Header, LogLevel, Message, Status};
use tracing::{debug, warn};

pub const HELP: &str = "commands: connect <address> <port> | disconnect | get <key> | \
                        put <key> [<value>|null] | logLevel <level> | help | quit";

/// What the connection handler does after answering.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Send the reply and keep reading.
    Reply(Message),
    /// Send the reply and close the connection.
    Close(Message),
    /// Send the reply, close the connection and stop accepting.
    Shutdown(Message),
}

impl Action {
    pub fn message(&self) -> &Message {
        match self {
            Action::Reply(m) | Action::Close(m) | Action::Shutdown(m) => m,
        }
    }
}

pub async fn dispatch(node: &KvNode, request: Message) -> Action {
    if let Err(e) = request.validate() {
        debug!(header = %request.header, error = %e, "rejected");
        let status = match request.header {
            Header::Get => Status::GetError,
            Header::Put | Header::AdminPut => Status::PutError,
            _ => Status::Failed,
        };
        return Action::Reply(request.reply(status, e.to_string()));
    }

    let reply = |(status, value): (Status, String)| Action::Reply(request.reply(status, value));
    match request.header {
        Header::Connect => reply((Status::ConnectSuccess, node.me().endpoint())),
        Header::Disconnect | Header::Quit => Action::Close(request.reply(Status::Success, "")),
        Header::Help => reply((Status::Success, HELP.to_string())),
        Header::Get => reply(node.handle_get(&request.key).await),
        Header::Put => reply(node.handle_put(&request.key, &request.value).await),
        Header::AdminPut => reply(node.admin_put(&request.key, &request.value).await),
        Header::LogLevel => {
            let result = request
                .key
                .parse::<LogLevel>()
                .map_err(|e| e.to_string())
                .and_then(|level| node.set_log_level(level).map_err(|e| e.to_string()));
            reply(outcome(result.map(|()| String::new())))
        }
        Header::Start => {
            node.start();
            reply((Status::Success, String::new()))
        }
        Header::Stop => {
            node.stop();
            reply((Status::Success, String::new()))
        }
        Header::Metadata => {
            if !request.value.is_empty() {
                node.update_metadata(&request.value);
            }
            reply((Status::Success, String::new()))
        }
        Header::Init => reply(outcome(
            node.init()
                .await
                .map(|entries| entries.to_string())
                .map_err(|e| e.to_string()),
        )),
        Header::AddNode => {
            let result = match parse_id(&request.key) {
                Ok(id) => node
                    .add_node(id, &request.value)
                    .await
                    .map(|report| report.moved.to_string())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            reply(outcome(result))
        }
        Header::RemoveNode => {
            let result = match parse_id(&request.key) {
                Ok(id) => node
                    .remove_node(id, &request.value)
                    .await
                    .map(|report| report.moved.to_string())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            reply(outcome(result))
        }
        Header::Shutdown => Action::Shutdown(request.reply(Status::Success, "")),
    }
}

fn outcome(result: Result<String, String>) -> (Status, String) {
    match result {
        Ok(value) => (Status::Success, value),
        Err(reason) => {
            warn!(%reason, "admin request failed");
            (Status::Failed, reason)
        }
    }
}

fn parse_id(key: &str) -> Result<NodeId, String> {
    key.trim()
        .parse::<u32>()
        .map(NodeId)
        .map_err(|e| format!("bad node id {key:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NodeStatus;
    use corelib::node::Node;
    use corelib::ring::RingBuilder;
    use replication::{Migrator, ProbePolicy, Replicator};
    use std::time::Duration;
    use storage::{CacheStrategy, StorageEngine};
    use tempfile::{tempdir, TempDir};

    fn node() -> (TempDir, KvNode) {
        let dir = tempdir().unwrap();
        let me = Node::new(NodeId(1), "127.0.0.1", 9);
        let ring = RingBuilder::new().add_node(me.clone()).build();
        let timeout = Duration::from_millis(100);
        let node = KvNode::new(
            me,
            ring,
            StorageEngine::new(dir.path().join("n.db"), CacheStrategy::Fifo, 4),
            Replicator::new(timeout),
            Migrator::new(timeout, ProbePolicy::default()),
            NodeStatus::Stopped,
        );
        (dir, node)
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_connection() {
        let (_dir, node) = node();
        let action = dispatch(&node, Message::get("a-key-longer-than-twenty-bytes")).await;
        let Action::Reply(reply) = action else {
            panic!("expected a plain reply");
        };
        assert_eq!(reply.status, Some(Status::GetError));
    }

    #[tokio::test]
    async fn test_bad_log_level_fails() {
        let (_dir, node) = node();
        let request = Message::request(Header::LogLevel, "LOUD", "");
        let action = dispatch(&node, request).await;
        assert_eq!(action.message().status, Some(Status::Failed));
    }

    #[tokio::test]
    async fn test_start_stop() {
        let (_dir, node) = node();
        dispatch(&node, Message::command(Header::Start)).await;
        assert_eq!(node.status(), NodeStatus::Active);
        dispatch(&node, Message::command(Header::Stop)).await;
        assert_eq!(node.status(), NodeStatus::Stopped);
    }

    #[tokio::test]
    async fn test_quit_closes_and_shutdown_stops() {
        let (_dir, node) = node();
        assert!(matches!(
            dispatch(&node, Message::request(Header::Quit, "", "")).await,
            Action::Close(_)
        ));
        assert!(matches!(
            dispatch(&node, Message::command(Header::Shutdown)).await,
            Action::Shutdown(_)
        ));
    }

    #[tokio::test]
    async fn test_init_reloads_and_stops() {
        let (_dir, node) = node();
        node.start();
        node.admin_put("k", "v").await;
        let action = dispatch(&node, Message::command(Header::Init)).await;
        assert_eq!(action.message().status, Some(Status::Success));
        assert_eq!(action.message().value, "1");
        assert_eq!(node.status(), NodeStatus::Stopped);
        assert_eq!(node.storage().cached_len(), 0);
    }

    #[tokio::test]
    async fn test_add_node_with_bad_id() {
        let (_dir, node) = node();
        let action = dispatch(&node, Message::request(Header::AddNode, "two", "")).await;
        assert_eq!(action.message().status, Some(Status::Failed));
    }
}
