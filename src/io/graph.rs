//! # Serializing relationship graphs
//!
//! Two document formats are supported:
//! - Cytoscape-style JSON (`elements.nodes[].data` and `elements.edges[].data`)
//! - GraphML with node attributes `name`, `type`, and for CNV nodes `genes`, `p`, `chi2`, `penncnv_conf`
//!
//! Region nodes get ids of the form `cnv<N>` so they never collide with sample ids.
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{info, warn};
use serde::Serialize;

use crate::{graph::RelationshipGraph, utils::format_float};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Cytoscape JSON
    Json,
    /// GraphML
    Graphml,
}

impl GraphFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            GraphFormat::Json => "json",
            GraphFormat::Graphml => "graphml",
        }
    }
}

pub fn region_node_id(region_idx: usize) -> String {
    format!("cnv{region_idx}")
}

#[derive(Serialize)]
struct CytoscapeDocument {
    elements: CytoscapeElements,
}

#[derive(Serialize)]
struct CytoscapeElements {
    nodes: Vec<CytoscapeElement<CytoscapeNode>>,
    edges: Vec<CytoscapeElement<CytoscapeEdge>>,
}

#[derive(Serialize)]
struct CytoscapeElement<T> {
    data: T,
}

#[derive(Serialize)]
struct CytoscapeNode {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<Vec<String>>,
    #[serde(rename = "annotation_Taxon")]
    annotation_taxon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chi2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    penncnv_conf: Option<f64>,
}

#[derive(Serialize)]
struct CytoscapeEdge {
    source: String,
    target: String,
}

pub fn write_cytoscape_json<W: Write>(mut writer: W, graph: &RelationshipGraph) -> Result<()> {
    let mut nodes = Vec::with_capacity(graph.n_sample_nodes() + graph.n_region_nodes());
    for sample in graph.samples() {
        nodes.push(CytoscapeElement {
            data: CytoscapeNode {
                annotation_taxon: sample.label().to_owned(),
                id: sample.id,
                name: None,
                alias: None,
                chi2: None,
                p: None,
                penncnv_conf: None,
            },
        });
    }
    for (idx, region, attributes) in graph.regions() {
        nodes.push(CytoscapeElement {
            data: CytoscapeNode {
                id: region_node_id(idx),
                name: Some(region.canonical_gene().to_owned()),
                alias: Some(region.genes.clone()),
                annotation_taxon: region.copy_number_class(),
                chi2: attributes.chi2,
                p: attributes.p_value,
                penncnv_conf: attributes.confidence,
            },
        });
    }
    let edges = graph
        .edges()
        .map(|(sample_id, region_idx)| CytoscapeElement {
            data: CytoscapeEdge {
                source: sample_id.to_owned(),
                target: region_node_id(region_idx),
            },
        })
        .collect();

    let document = CytoscapeDocument {
        elements: CytoscapeElements { nodes, edges },
    };
    serde_json::to_writer(&mut writer, &document).context("Could not serialize graph to JSON")?;
    writer.flush()?;
    Ok(())
}

/// The GraphML keys declared in the header: (id, type).
const GRAPHML_KEYS: &[(&str, &str)] = &[
    ("name", "string"),
    ("type", "string"),
    ("genes", "string"),
    ("p", "double"),
    ("chi2", "double"),
    ("penncnv_conf", "double"),
];

pub fn write_graphml<W: Write>(mut writer: W, graph: &RelationshipGraph) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;
    for (id, attr_type) in GRAPHML_KEYS {
        writeln!(
            writer,
            r#"  <key id="{id}" for="node" attr.name="{id}" attr.type="{attr_type}" />"#
        )?;
    }
    writeln!(writer, r#"  <graph edgedefault="undirected">"#)?;

    for sample in graph.samples() {
        let name = if sample.affected { "+" } else { "-" };
        writeln!(writer, r#"    <node id="{}">"#, xml_escape(&sample.id))?;
        write_graphml_data(&mut writer, "name", name)?;
        write_graphml_data(&mut writer, "type", sample.label())?;
        writeln!(writer, "    </node>")?;
    }
    for (idx, region, attributes) in graph.regions() {
        writeln!(writer, r#"    <node id="{}">"#, region_node_id(idx))?;
        write_graphml_data(&mut writer, "name", region.canonical_gene())?;
        write_graphml_data(&mut writer, "genes", &region.gene_string())?;
        write_graphml_data(&mut writer, "type", &region.copy_number_class())?;
        let numeric = [
            ("p", attributes.p_value),
            ("chi2", attributes.chi2),
            ("penncnv_conf", attributes.confidence),
        ];
        for (key, value) in numeric {
            if let Some(value) = value {
                write_graphml_data(&mut writer, key, &format_float(value))?;
            }
        }
        writeln!(writer, "    </node>")?;
    }
    for (sample_id, region_idx) in graph.edges() {
        writeln!(
            writer,
            r#"    <edge source="{}" target="{}" />"#,
            xml_escape(sample_id),
            region_node_id(region_idx)
        )?;
    }

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</graphml>")?;
    writer.flush()?;
    Ok(())
}

fn write_graphml_data<W: Write>(writer: &mut W, key: &str, value: &str) -> io::Result<()> {
    writeln!(
        writer,
        r#"      <data key="{key}">{}</data>"#,
        xml_escape(value)
    )
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write the graph of `family` to `<outdir>/<family>.<extension>`.
pub fn write_family_graph(
    outdir: &Path,
    family: &str,
    graph: &RelationshipGraph,
    format: GraphFormat,
) -> Result<PathBuf> {
    let path = outdir.join(format!("{family}.{}", format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("Could not create graph file {}", path.display()))?;
    let writer = BufWriter::new(file);
    match format {
        GraphFormat::Json => write_cytoscape_json(writer, graph),
        GraphFormat::Graphml => write_graphml(writer, graph),
    }
    .with_context(|| format!("Could not write graph file {}", path.display()))?;

    Ok(path)
}

/// Write one graph per family into `outdir`, creating it if needed. A family whose graph
/// cannot be written is reported and skipped; the other families are still written, and
/// the call fails afterwards with an I/O error naming how many graphs are missing.
pub fn write_family_graphs<'a, I>(outdir: &str, graphs: I, format: GraphFormat) -> Result<usize>
where
    I: IntoIterator<Item = (&'a str, &'a RelationshipGraph)>,
{
    fs::create_dir_all(outdir)
        .with_context(|| format!("Could not create output directory {outdir}"))?;

    let mut n_written = 0;
    let mut failed: Vec<&str> = Vec::new();
    for (family, graph) in graphs {
        match write_family_graph(Path::new(outdir), family, graph, format) {
            Ok(path) => {
                n_written += 1;
                info!(
                    "Wrote graph with {} samples and {} CNVs for family {family} to {}",
                    graph.n_sample_nodes(),
                    graph.n_region_nodes(),
                    path.display()
                );
            }
            Err(e) => {
                warn!("Skipping graph for family {family}: {e:?}");
                failed.push(family);
            }
        }
    }

    if !failed.is_empty() {
        return Err(io::Error::other(format!(
            "Could not write graphs for {} families: {}",
            failed.len(),
            failed.join(", ")
        ))
        .into());
    }
    Ok(n_written)
}
