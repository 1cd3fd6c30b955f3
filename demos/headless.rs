use maplet_interact::{
    default_reporter, GeometryKind, HeadlessSurface, ListenerOptions, MapEventType, MapTools,
    Point, ProgrammaticSelectOptions, SelectHandler, SelectMode, SelectOptions, SimpleFeature,
    ToolEvent, ToolEventOptions, VectorLayer,
};
use std::sync::Arc;

/// Drives event listeners and feature selection against the headless surface
fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("🗺️ maplet-interact Headless Example");
    println!("====================================");

    let stations = VectorLayer::new("stations")
        .with_feature(SimpleFeature::point("s1", 100.0, 100.0).with_property("line", "red"))
        .with_feature(SimpleFeature::point("s2", 220.0, 140.0).with_property("line", "red"))
        .with_feature(SimpleFeature::point("s3", 300.0, 260.0).with_property("line", "blue"));
    let surface = Arc::new(HeadlessSurface::new().with_layer(stations));
    let reporter = default_reporter();

    // Raw listeners
    let tools = MapTools::new(surface.clone(), reporter.clone());
    tools.map_on_event(
        "click",
        |event| {
            if let ToolEvent::Click { feature, pixel, .. } = event {
                let id = feature.as_ref().and_then(|f| f.id().map(str::to_owned));
                println!("   🖱️ click at {:?} on {:?}", pixel, id);
            }
            Ok(())
        },
        ToolEventOptions::new().click_type(GeometryKind::Point),
    )?;
    tools.event_manager().on(
        MapEventType::ZoomEnd,
        |event| {
            println!("   🔍 zoom ended at {:?}", event.zoom);
            Ok(())
        },
        ListenerOptions::default(),
    )?;

    // Interactive selection
    let select = SelectHandler::new(surface.clone(), reporter);
    select.enable_select(
        SelectMode::Click,
        SelectOptions::new().multi(true).on_select(|event| {
            println!("   ✅ selected {} feature(s)", event.selected.len());
            Ok(())
        }),
    )?;

    println!("\n🎯 Simulating clicks:");
    surface.click(Point::new(100.0, 100.0));
    surface.click(Point::new(220.0, 140.0));
    surface.click(Point::new(500.0, 500.0));
    println!("   Selected: {}", select.get_selected_features().len());

    println!("\n📌 Programmatic selection:");
    let diff = select.select_by_property(
        "line",
        "blue",
        &ProgrammaticSelectOptions::new().fit_view(true),
    )?;
    println!(
        "   +{} / -{} features, {} highlight layer(s)",
        diff.added.len(),
        diff.removed.len(),
        surface.highlight_count()
    );
    for request in surface.fit_requests() {
        println!("   Fit to {:?}", request.extent);
    }

    surface.set_view(Point::new(0.0, 0.0), 3.0, 0.5);

    for info in tools.event_listeners_info() {
        println!("   👂 {}", serde_json::to_string(&info)?);
    }

    select.destroy();
    tools.destroy();
    println!("\n🎉 Done, {} native subscription(s) left", surface.total_subscriptions());
    Ok(())
}
