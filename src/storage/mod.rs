//! Graph persistence
//!
//! Writes go to a sibling temporary file that is renamed into place, so a
//! failed run never leaves a truncated graph at the destination.

pub mod codec;

pub use codec::{decode, encode, GraphFormat};

use crate::core::Result;
use crate::graph::Graph;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write `graph` to `path` in `format`, returning the bytes written
pub fn write_graph(graph: &Graph, path: impl AsRef<Path>, format: GraphFormat) -> Result<usize> {
    let path = path.as_ref();
    let bytes = encode(graph, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    debug!("Staging graph at {:?}", staging);
    if let Err(e) = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }

    info!(
        "Wrote {} graph ({} vertices, {} edges, {} bytes) to {:?}",
        format.name(),
        graph.vertex_count(),
        graph.edge_count(),
        bytes.len(),
        path
    );
    Ok(bytes.len())
}

/// Read a graph from `path` in `format`
pub fn read_graph(path: impl AsRef<Path>, format: GraphFormat) -> Result<Graph> {
    let bytes = fs::read(path.as_ref())?;
    decode(&bytes, format)
}

/// Read a graph, inferring the format from the file extension
pub fn read_graph_auto(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    read_graph(path, GraphFormat::from_path(path))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GroupKey;
    use crate::graph::{Edge, Vertex};

    fn sample() -> Graph {
        let vertices = vec![Vertex::new(GroupKey::from("A")), Vertex::new(GroupKey::from("B"))];
        let edges = Edge::new(GroupKey::from("A"), GroupKey::from("B"));
        Graph::from_parts("zone", vertices, edges)
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["graph.json", "graph.msgpack", "graph.bin"] {
            let path = dir.path().join(name);
            let written = write_graph(&sample(), &path, GraphFormat::from_path(&path)).unwrap();
            assert!(written > 0);
            assert_eq!(read_graph_auto(&path).unwrap(), sample());
            assert!(!staging_path(&path).exists());
        }
    }

    #[test]
    fn test_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/graph.json");
        write_graph(&sample(), &path, GraphFormat::Json).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_graph(dir.path().join("absent.json"), GraphFormat::Json);
        assert!(matches!(result, Err(crate::core::Error::Io(_))));
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(staging_path(Path::new("/tmp/g.json")), PathBuf::from("/tmp/g.json.tmp"));
    }
}
