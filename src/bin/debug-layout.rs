/// Diagnostic tool to verify tree → layout → query pipeline
use hiermap::layout::{Margin, Point, Rect, TreeMap};
use hiermap::tree::{aggregate, import, HierNode, HierTree};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hiermap=debug".parse().unwrap()),
        )
        .init();

    println!("=== DIAGNOSTIC: Tree → Layout Pipeline ===");

    let tree = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            println!("Loading node dump: {}", path.display());
            import::load_node_dump_file(&path)?
        }
        None => {
            println!("No input file given, using a synthetic tree");
            synthetic_tree()
        }
    };

    println!("\n[1] Tree built: {} nodes", tree.len());

    let root_node = tree.get(tree.root);
    println!(
        "    Root: '{}' (size={:.0}, count={:.0})",
        root_node.key, root_node.metrics[0], root_node.metrics[1]
    );

    println!("\n[2] Top 10 children of root:");
    let mut root_children: Vec<_> = tree.children(tree.root).collect();
    root_children.sort_by(|&a, &b| {
        tree.get(b).metrics[0]
            .partial_cmp(&tree.get(a).metrics[0])
            .unwrap()
    });

    for (i, child_id) in root_children.iter().take(10).enumerate() {
        let child = tree.get(*child_id);
        println!(
            "    [{}] '{}' - size {:.0} (children={})",
            i,
            child.key,
            child.metrics[0],
            tree.children(*child_id).count()
        );
    }

    // Layout at a typical canvas size, whole canvas visible
    let (virt_w, virt_h) = (1920.0, 1080.0);
    let viewport = Rect::new(0.0, 0.0, virt_w, virt_h);
    let margin = Margin::new(8.0, 24.0, -8.0, -8.0);

    let mut map = TreeMap::new();
    let areas = map
        .layout(&tree, tree.root, virt_w, virt_h, viewport, margin, 0)
        .to_vec();

    println!("\n[3] Layout computed: {} tiles", areas.len());

    println!("\n[4] Top 10 largest tiles by area:");
    let mut sorted = areas.clone();
    sorted.sort_by(|a, b| b.rect.area().partial_cmp(&a.rect.area()).unwrap());
    for (i, e) in sorted.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {:.1}x{:.1} at ({:.1}, {:.1}) level={} leaf={}",
            i,
            e.key,
            e.rect.width(),
            e.rect.height(),
            e.rect.left,
            e.rect.top,
            e.level,
            e.is_leaf
        );
    }

    let leaf_area: f64 = areas
        .iter()
        .filter(|e| e.is_leaf)
        .map(|e| e.rect.area())
        .sum();
    println!("\n[5] Render-leaf coverage: {:.1}% of canvas", leaf_area / (virt_w * virt_h) * 100.0);

    // Second identical frame should be answered entirely from the cache
    let rebuilds = map.cache_rebuilds();
    map.layout(&tree, tree.root, virt_w, virt_h, viewport, margin, 0);
    println!(
        "\n[6] Cache: {} partition rebuilds after frame 1, {} after identical frame 2",
        rebuilds,
        map.cache_rebuilds()
    );

    let center = Point::new(virt_w / 2.0, virt_h / 2.0);
    if let Some(path) = map.path_at(&tree, center) {
        println!("\n[7] Node at canvas center: {}", path);
    }

    Ok(())
}

/// A small two-level hierarchy with a deliberate residual, exercising the
/// same passes a report importer runs.
fn synthetic_tree() -> HierTree {
    let mut tree = HierTree::new("chip");
    let add = |tree: &mut HierTree, parent, key: &str, size: f64, dir: bool| {
        tree.add_child(
            parent,
            HierNode {
                key: key.into(),
                metrics: [size, 1.0],
                is_dir: dir,
                parent: None,
                first_child: None,
                next_sibling: None,
                depth: 0,
            },
        )
    };

    let root = tree.root;
    tree.get_mut(root).metrics = [1000.0, 0.0];
    let cpu = add(&mut tree, root, "cpu", 600.0, true);
    add(&mut tree, cpu, "alu", 250.0, false);
    add(&mut tree, cpu, "regfile", 200.0, false);
    let mem = add(&mut tree, root, "mem", 300.0, true);
    add(&mut tree, mem, "sram", 300.0, false);
    add(&mut tree, root, "io", 100.0, false);

    // cpu states 600 but children account for 450: synthesize "others"
    aggregate::synthesize_residual(&mut tree);
    aggregate::aggregate_metrics(&mut tree);
    tree
}
