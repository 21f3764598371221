use crate::bio::alignment::DetailedAlignment;
use crate::core::matrix::DistanceMatrix;
use crate::core::wpgma::{ClusterId, ClusterTree};
use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};
use std::fmt::Write;

/// Width of one alignment block in the text report.
const ALIGNMENT_LINE_WIDTH: usize = 60;

pub fn matrix_table(matrix: &DistanceMatrix, precision: usize) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("")];
    header.extend(
        matrix
            .ids()
            .map(|id| Cell::new(id).add_attribute(Attribute::Bold).fg(TableColor::Cyan)),
    );
    table.set_header(header);

    for (i, id) in matrix.ids().enumerate() {
        let mut row = vec![Cell::new(id).add_attribute(Attribute::Bold)];
        for j in 0..matrix.len() {
            let cell = Cell::new(format!("{:.*}", precision, matrix.get(i, j)))
                .set_alignment(CellAlignment::Right);
            row.push(if i == j { cell.fg(TableColor::DarkGrey) } else { cell });
        }
        table.add_row(row);
    }

    table.to_string()
}

pub fn tree_report(tree: &ClusterTree, precision: usize) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "WPGMA Clustering")?;
    writeln!(&mut output, "================")?;
    writeln!(&mut output, "Leaves: {}", tree.leaf_count())?;
    writeln!(&mut output, "Root height: {:.*}", precision, tree.root_node().height)?;
    writeln!(&mut output)?;

    writeln!(&mut output, "Merges")?;
    writeln!(&mut output, "------")?;
    for (step, cluster) in tree.merges().enumerate() {
        if let Some((left, right)) = cluster.children {
            writeln!(
                &mut output,
                "{:>4}. {} = {} + {} at {:.*} ({} leaves)",
                step + 1,
                cluster.id,
                display_node(tree, left),
                display_node(tree, right),
                precision,
                cluster.height,
                cluster.leaf_count
            )?;
        }
    }
    writeln!(&mut output)?;

    writeln!(&mut output, "Dendrogram")?;
    writeln!(&mut output, "----------")?;
    write_dendrogram(tree, precision, &mut output)?;
    writeln!(&mut output)?;

    writeln!(&mut output, "Newick")?;
    writeln!(&mut output, "------")?;
    writeln!(&mut output, "{}", tree.to_newick())?;

    Ok(output)
}

fn display_node(tree: &ClusterTree, id: ClusterId) -> String {
    match tree.node(id).and_then(|n| n.label.as_deref()) {
        Some(label) => label.to_string(),
        None => id.to_string(),
    }
}

fn write_dendrogram(tree: &ClusterTree, precision: usize, output: &mut String) -> Result<()> {
    // (node, prefix for its children, connector drawn before it)
    let mut stack: Vec<(ClusterId, String, &str)> = vec![(tree.root(), String::new(), "")];

    while let Some((id, prefix, connector)) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let indent = prefix
            .strip_suffix("    ")
            .or_else(|| prefix.strip_suffix("│   "))
            .unwrap_or("");

        match node.children {
            Some((left, right)) => {
                writeln!(
                    output,
                    "{}{}{} [{:.*}]",
                    indent, connector, id, precision, node.height
                )?;
                stack.push((right, format!("{}    ", prefix), "└── "));
                stack.push((left, format!("{}│   ", prefix), "├── "));
            }
            None => {
                writeln!(output, "{}{}{}", indent, connector, display_node(tree, id))?;
            }
        }
    }

    Ok(())
}

pub fn alignment_report(alignment: &DetailedAlignment, precision: usize) -> Result<String> {
    let mut output = String::new();
    let first_id = &alignment.result.first_id;
    let second_id = &alignment.result.second_id;

    writeln!(&mut output, "Global Alignment")?;
    writeln!(&mut output, "================")?;
    writeln!(&mut output, "{} vs {}", first_id, second_id)?;
    writeln!(&mut output, "Score:    {}", alignment.score())?;
    writeln!(&mut output, "Distance: {:.*}", precision, alignment.distance())?;
    writeln!(&mut output, "Identity: {:.1}%", alignment.identity * 100.0)?;
    writeln!(&mut output, "Columns:  {}", alignment.len())?;
    writeln!(&mut output)?;

    let width = first_id.len().max(second_id.len());
    let rows = alignment
        .first_aligned
        .chunks(ALIGNMENT_LINE_WIDTH)
        .zip(alignment.alignment_string.chunks(ALIGNMENT_LINE_WIDTH))
        .zip(alignment.second_aligned.chunks(ALIGNMENT_LINE_WIDTH));

    for ((first, markers), second) in rows {
        writeln!(&mut output, "{:<width$}  {}", first_id, String::from_utf8_lossy(first))?;
        writeln!(&mut output, "{:<width$}  {}", "", String::from_utf8_lossy(markers))?;
        writeln!(&mut output, "{:<width$}  {}", second_id, String::from_utf8_lossy(second))?;
        writeln!(&mut output)?;
    }

    Ok(output)
}
