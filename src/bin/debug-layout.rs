/// Diagnostic tool to verify data → tree → partition → label pipeline
use sunburst::config::ChartConfig;
use sunburst::data::{DataView, RowIdentity, SourceRow};
use sunburst::labels::placement::place_detail_labels;
use sunburst::labels::{DisplayUnits, ValueFormatter};
use sunburst::layout::{self, ScaleState};
use sunburst::render::colors::Palette;
use sunburst::tree::build_tree;
use vello::kurbo::Point;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sunburst=debug".parse().unwrap()),
        )
        .init();

    let view = synthetic_view();
    println!("=== DIAGNOSTIC: Data → Partition Pipeline ===");
    println!("Rows: {}", view.rows.len());

    view.validate()?;

    // Build tree
    let mut tree = build_tree(&view, &Palette::default());
    println!("\n[1] Tree built: {} nodes, {} rings", tree.len(), tree.max_depth() + 1);

    let root = tree.get(tree.root);
    println!("    Root total: {:.2}", root.value);

    println!("\n[2] First-ring branches (angular order):");
    for (i, id) in tree.children(tree.root).enumerate() {
        let node = tree.get(id);
        println!(
            "    [{}] '{}' - value {:.2}, leaves {}",
            i,
            node.name,
            node.value,
            tree.descendants(id).iter().filter(|&&d| tree.get(d).is_leaf()).count()
        );
    }

    // Partition
    layout::compute_spans(&mut tree);
    let config = ChartConfig::default();
    let viewport = (1280.0, 720.0);
    let radius = layout::effective_radius(&config, viewport.0, viewport.1);
    let scales = ScaleState::full(radius);
    println!("\n[3] Spans computed, radius {:.1}px", radius);

    println!("\n[4] Leaf arcs:");
    for id in tree.descendants(tree.root) {
        let node = tree.get(id);
        if !node.is_leaf() {
            continue;
        }
        let a0 = scales.angle(node.span.x).to_degrees();
        let a1 = scales.angle(node.span.x + node.span.dx).to_degrees();
        println!(
            "    '{}' - {:.1}° to {:.1}° (value {:.2}, band {:.2})",
            node.name, a0, a1, node.value, node.opacity
        );
    }

    // Span closure check
    let mut max_gap = 0.0f64;
    for i in 0..tree.len() {
        let id = sunburst::tree::arena::NodeId(i as u32);
        if tree.get(id).first_child.is_none() {
            continue;
        }
        let child_sum: f64 = tree.children(id).map(|c| tree.get(c).span.dx).sum();
        max_gap = max_gap.max((child_sum - tree.get(id).span.dx).abs());
    }
    println!("\n[5] Max partition closure error: {max_gap:.2e}");

    // Label placement
    let center = Point::new(viewport.0 / 2.0, viewport.1 / 2.0);
    let formatter = ValueFormatter::new(DisplayUnits::Auto, 0);
    let mut text = sunburst::labels::measure::TextRenderer::new();
    if text.load_system_font("default").is_ok() {
        let labels = place_detail_labels(
            &tree,
            &scales,
            center,
            radius,
            viewport,
            &config.detail_labels,
            &formatter,
            |_| true,
            &mut text,
        );
        let visible = labels.iter().filter(|l| l.visible).count();
        println!("\n[6] Detail labels: {} placed, {} visible", labels.len(), visible);
        for label in labels.iter().filter(|l| l.visible) {
            println!(
                "    '{}' at ({:.1}, {:.1}){}",
                label.first_row,
                label.anchor.x,
                label.anchor.y,
                label.second_row.as_deref().map(|s| format!(" / '{s}'")).unwrap_or_default()
            );
        }
    } else {
        println!("\n[6] No system font found, skipping label placement");
    }

    Ok(())
}

fn synthetic_view() -> DataView {
    let groups = [
        ("North", &["Hardware", "Software", "Services"][..]),
        ("South", &["Hardware", "Software"][..]),
        ("East", &["Services", "Licensing"][..]),
        ("West", &["Hardware"][..]),
    ];
    let mut rows = Vec::new();
    let mut id = 0u64;
    for (region, subs) in groups {
        for (i, sub) in subs.iter().enumerate() {
            id += 1;
            rows.push(
                SourceRow::new(RowIdentity(id), 1000.0 * (i as f64 + 1.0) + id as f64 * 37.0)
                    .with_key("Region", region)
                    .with_key("Segment", sub),
            );
        }
    }
    DataView {
        group_field: "Region".into(),
        category_fields: vec!["Segment".into()],
        rows,
        ..Default::default()
    }
}
