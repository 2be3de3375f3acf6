use std::collections::VecDeque;
use std::io::Write;
use std::process::Stdio;

use dot_writer::Attributes;
use dot_writer::DotWriter;

use crate::data::Model;

fn node_name(id: usize) -> String {
    format!("n{id}")
}

/// Label for a node without children: its kind over its source text.
fn leaf_label(model: &Model) -> maud::Markup {
    let text = match model {
        Model::Comment(c) => c.text().to_owned(),
        other => other.to_string(),
    };
    maud::html!(
        table border="0" cellborder="1" cellspacing="0" {
            tr { td { b { (model.kind()) } } }
            tr { td { (text) } }
        }
    )
}

/// Label for a bracketed form: its kind over one port per child.
fn sequence_label(model: &Model, items: &[Model]) -> maud::Markup {
    let columns = items.len().max(1);
    maud::html!(
        table border="0" cellborder="1" cellspacing="0" {
            tr { td colspan=(columns) { b { (model.kind()) } } }
            @if !items.is_empty() {
                tr {
                    @for i in 0..items.len() {
                        td port=(format!("p{i}")) { (i) }
                    }
                }
            }
        }
    )
}

/// Render a read syntax tree as a Graphviz graph.
///
/// Each top-level model is the root of its own tree. Bracketed forms have
/// an edge from each child port to the child's node.
pub fn render_graphviz(models: &[Model]) -> Vec<u8> {
    let mut outbuf = Vec::new();
    {
        let mut writer = DotWriter::from(&mut outbuf);
        let mut graph = writer.digraph();
        let mut next_id = 0;
        let mut queue = VecDeque::new();
        for model in models {
            queue.push_back((model, next_id));
            next_id += 1;
        }

        while let Some((model, id)) = queue.pop_front() {
            let mut node = graph.node_named(node_name(id));
            node.set_shape(dot_writer::Shape::None);
            let Some(items) = model.items() else {
                node.set_html(&format!("<{}>", leaf_label(model).into_string()));
                continue;
            };
            node.set_html(&format!("<{}>", sequence_label(model, items).into_string()));
            let ports: Vec<_> = (0..items.len())
                .map(|i| node.id().port(&format!("p{i}")))
                .collect();
            std::mem::drop(node);
            for (item, port) in items.iter().zip(ports) {
                graph.edge(port, node_name(next_id));
                queue.push_back((item, next_id));
                next_id += 1;
            }
        }
    }
    outbuf
}

/// Render a read syntax tree to SVG, using the `dot` program.
///
/// If `SAFEHY_SAVE_GRAPH` is set, or `dot` fails, the DOT source is kept in a
/// temporary file and its path logged.
pub fn render_svg(models: &[Model]) -> Result<String, String> {
    let gv = render_graphviz(models);

    let mut dotgraph = std::process::Command::new("dot")
        .arg("-Tsvg")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to launch graph render: {e}"))?;
    dotgraph
        .stdin
        .take()
        .ok_or_else(|| "dot has no stdin".to_owned())?
        .write_all(&gv)
        .map_err(|e| format!("failed to provide graphviz input: {e}"))?;
    let dotgraph = dotgraph
        .wait_with_output()
        .map_err(|e| format!("failed to complete dot command: {e}"))?;

    if !dotgraph.status.success() || std::env::var_os("SAFEHY_SAVE_GRAPH").is_some() {
        save_graph(&gv);
    }

    if dotgraph.status.success() {
        Ok(String::from_utf8_lossy(&dotgraph.stdout).to_string())
    } else {
        Err(format!(
            "failed to render syntax tree: dot failed: {}",
            &String::from_utf8_lossy(&dotgraph.stderr)
        ))
    }
}

fn save_graph(gv: &[u8]) {
    let saved = tempfile::NamedTempFile::new().and_then(|mut f| {
        f.write_all(gv)?;
        let (_, pathbuf) = f.keep()?;
        Ok(pathbuf)
    });
    match saved {
        Ok(pathbuf) => tracing::info!("DOT source in {}", pathbuf.display()),
        Err(e) => tracing::warn!("could not save DOT source: {e}"),
    }
}
