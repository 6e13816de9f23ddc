use super::support::*;
use crate::*;
use futures::executor::block_on;
use glimpse_core::geom::{screen_point, screen_rect, screen_vector};
use glimpse_core::{Background, ContentKind, Transform};
use std::time::{Duration, Instant};

const MARKUP: &str = "<div><h1>Title</h1><p>Body text</p></div>";
const WIDE_SVG: &str = r#"<svg viewBox="0 0 300 150"><rect width="300" height="150" fill="red"/></svg>"#;

fn wheel(delta_y: f64, x: f64, y: f64, at: Instant) -> InputEvent {
    InputEvent::Wheel {
        delta_y,
        position: screen_point(x, y),
        at,
    }
}

#[test]
fn markup_interaction_switches_to_raster() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();

    assert!(engine.is_interacting());
    assert_eq!(engine.pending_jobs().len(), 1);
    assert_eq!(engine.mode_kind(), ModeKind::Vector);

    assert_eq!(engine.drive_rasterization(), 1);
    assert_eq!(engine.mode_kind(), ModeKind::Raster);
    assert_eq!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            placement: RasterPlacement {
                bitmap_scale: 1.0,
                offset: screen_vector(0.0, 0.0),
            },
        })
    );
}

#[test]
fn vector_interaction_never_leaves_vector_mode() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    engine.start_interaction();

    assert!(engine.is_interacting());
    assert!(engine.pending_jobs().is_empty());
    assert_eq!(engine.drive_rasterization(), 0);
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
    assert_eq!(engine.rasterizer().calls.get(), 0);
}

#[test]
fn start_interaction_is_idempotent() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    engine.start_interaction();
    assert_eq!(engine.pending_jobs().len(), 1);
}

#[test]
fn end_interaction_without_start_is_a_no_op() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    let before = log.len();
    engine.end_interaction();
    assert_eq!(log.len(), before);
    assert!(!engine.is_interacting());
}

#[test]
fn drag_pans_the_snapshot_and_release_restores_vector_path() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);

    engine.handle_event(InputEvent::PointerDown {
        position: screen_point(10.0, 10.0),
    });
    engine.drive_rasterization();
    engine.handle_event(InputEvent::PointerMove {
        position: screen_point(30.0, 50.0),
    });

    assert_eq!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            placement: RasterPlacement {
                bitmap_scale: 1.0,
                offset: screen_vector(20.0, 40.0),
            },
        })
    );

    engine.handle_event(InputEvent::PointerUp {
        position: screen_point(30.0, 50.0),
    });
    assert!(!engine.is_interacting());
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
    assert_eq!(engine.transform(), Transform::new(1.0, 20.0, 40.0));
    assert_eq!(
        log.last(),
        Some(Call::Vector {
            content: MARKUP.to_string(),
            kind: ContentKind::Markup,
            transform: Transform::new(1.0, 20.0, 40.0),
        })
    );
}

#[test]
fn pointer_move_without_press_does_nothing() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    let before = log.len();
    engine.handle_event(InputEvent::PointerMove {
        position: screen_point(30.0, 50.0),
    });
    engine.handle_event(InputEvent::PointerUp {
        position: screen_point(30.0, 50.0),
    });
    assert_eq!(log.len(), before);
    assert_eq!(engine.transform(), Transform::IDENTITY);
}

#[test]
fn wheel_interaction_ends_after_debounce_with_exact_transform() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    let t0 = Instant::now();

    engine.handle_event(wheel(-1.0, 200.0, 100.0, t0));
    engine.drive_rasterization();
    assert_eq!(engine.mode_kind(), ModeKind::Raster);

    assert!(!engine.tick(t0 + Duration::from_millis(100)));
    engine.handle_event(wheel(-1.0, 200.0, 100.0, t0 + Duration::from_millis(100)));
    // A second tick within the window extends it.
    assert!(!engine.tick(t0 + Duration::from_millis(200)));
    assert_eq!(engine.mode_kind(), ModeKind::Raster);
    assert_eq!(engine.rasterizer().calls.get(), 1);

    assert!(engine.tick(t0 + Duration::from_millis(250)));
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
    assert!(!engine.is_interacting());
    assert!(engine.next_deadline().is_none());

    let transform = engine.transform();
    assert!(approx(transform.scale, 1.1 * 1.1));
    assert_eq!(
        log.last(),
        Some(Call::Vector {
            content: MARKUP.to_string(),
            kind: ContentKind::Markup,
            transform,
        })
    );
}

#[test]
fn wheel_direction_selects_zoom_factor() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    let t0 = Instant::now();

    engine.handle_event(wheel(3.0, 0.0, 0.0, t0));
    assert!(approx(engine.transform().scale, 0.9));
    engine.handle_event(wheel(0.0, 0.0, 0.0, t0));
    assert!(approx(engine.transform().scale, 0.9 * 1.1));
}

#[test]
fn zoom_anchor_is_relative_to_surface_origin() {
    let (mut engine, _log) = engine_at(
        screen_rect(100.0, 50.0, 400.0, 300.0),
        FakeRasterizer::default(),
    );
    engine.set_content(WIDE_SVG, ContentKind::Vector);

    // The surface's own top-left corner: content origin stays put.
    engine.zoom(2.0, screen_point(100.0, 50.0));
    assert_eq!(engine.transform(), Transform::new(2.0, 0.0, 0.0));

    // Content under surface-local (40, 20) stays there.
    let anchor_local = screen_point(40.0, 20.0);
    let before = engine.transform().content_point_under(anchor_local);
    engine.zoom(1.5, screen_point(140.0, 70.0));
    let after = engine.transform().content_point_under(anchor_local);
    assert!(approx(before.x, after.x) && approx(before.y, after.y));
}

#[test]
fn raster_mode_reuses_the_snapshot() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    engine.drive_rasterization();

    engine.zoom(2.0, screen_point(0.0, 0.0));
    engine.pan(screen_vector(10.0, 0.0));

    assert_eq!(engine.rasterizer().calls.get(), 1);
    assert!(engine.pending_jobs().is_empty());
    assert_eq!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            placement: RasterPlacement {
                bitmap_scale: 2.0,
                offset: screen_vector(10.0, 0.0),
            },
        })
    );
}

#[test]
fn snapshot_for_previous_content_is_discarded() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    let jobs = engine.take_raster_jobs();
    assert_eq!(jobs.len(), 1);
    let stale_generation = jobs[0].generation;

    engine.set_content("<p>replaced</p>", ContentKind::Markup);
    assert!(engine.generation() > stale_generation);

    let rasterizer = FakeRasterizer::default();
    for job in jobs {
        assert!(!engine.complete_rasterization(job.run(&rasterizer)));
    }
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
}

#[test]
fn set_content_drops_queued_jobs() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    assert!(engine.pending_jobs().is_empty());
    assert_eq!(engine.drive_rasterization(), 0);
}

#[test]
fn failed_snapshot_keeps_vector_mode() {
    let (mut engine, log) = engine_at(
        screen_rect(0.0, 0.0, 800.0, 600.0),
        FakeRasterizer::failing(),
    );
    engine.set_content("<div><p>unclosed", ContentKind::Markup);
    engine.start_interaction();
    assert_eq!(engine.drive_rasterization(), 0);
    assert_eq!(engine.rasterizer().calls.get(), 1);
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
    assert!(engine.is_interacting());

    // Interaction still pans the vector path.
    engine.pan(screen_vector(5.0, 5.0));
    assert!(matches!(log.last(), Some(Call::Vector { .. })));
}

#[test]
fn snapshot_arriving_after_interaction_end_is_discarded() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    let jobs = engine.take_raster_jobs();
    engine.end_interaction();

    let rasterizer = FakeRasterizer::default();
    for job in jobs {
        assert!(!engine.complete_rasterization(job.run(&rasterizer)));
    }
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
}

#[test]
fn jobs_can_run_asynchronously() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.handle_event(InputEvent::PointerDown {
        position: screen_point(0.0, 0.0),
    });
    engine.zoom(2.0, screen_point(0.0, 0.0));

    let rasterizer = FakeRasterizer::default();
    let jobs = engine.take_raster_jobs();
    let outcomes: Vec<_> = jobs
        .into_iter()
        .map(|job| block_on(job.run_async(&rasterizer)))
        .collect();
    for outcome in outcomes {
        assert!(engine.complete_rasterization(outcome));
    }

    // Captured at scale 1, shown at scale 2.
    let snapshot = engine.mode().snapshot().expect("raster mode");
    assert_eq!(snapshot.captured, Transform::IDENTITY);
    assert_eq!(snapshot.bitmap.width(), 100);
}

#[test]
fn set_content_resets_transform_and_sizes_vector_content() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.zoom(3.0, screen_point(10.0, 10.0));
    engine.pan(screen_vector(7.0, 9.0));

    let svg = r#"<svg viewBox="0 0 10 10"><circle r="4"/></svg>"#;
    engine.set_content(svg, ContentKind::Vector);
    assert_eq!(engine.transform(), Transform::IDENTITY);
    assert_eq!(engine.content(), svg);
    assert_eq!(
        log.last(),
        Some(Call::Vector {
            content: r#"<svg width="100%" height="100%" viewBox="0 0 10 10"><circle r="4"/></svg>"#
                .to_string(),
            kind: ContentKind::Vector,
            transform: Transform::IDENTITY,
        })
    );
}

#[test]
fn reset_returns_to_identity() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    engine.zoom(4.0, screen_point(33.0, 21.0));
    engine.pan(screen_vector(-8.0, 2.0));
    engine.reset();
    assert_eq!(engine.transform(), Transform::IDENTITY);
}

#[test]
fn export_uses_view_box_size_times_scale() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);

    let png = engine.raster_export(1.0, Background::Transparent).unwrap();
    assert_eq!(png_size(&png), (300, 150));

    let png = engine.raster_export(2.0, Background::White).unwrap();
    assert_eq!(png_size(&png), (600, 300));
}

#[test]
fn export_ignores_pan_and_zoom() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    engine.zoom(5.0, screen_point(400.0, 300.0));
    let png = engine.raster_export(1.0, Background::Black).unwrap();
    assert_eq!(png_size(&png), (300, 150));
}

#[test]
fn export_supports_jpeg() {
    let (mut engine, _log) = engine();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    let options = ExportOptions {
        scale: 1.0,
        background: Background::White,
        format: ExportFormat::Jpeg,
        ..Default::default()
    };
    let jpg = engine.export(&options).unwrap();
    assert!(jpg.starts_with(&[0xFF, 0xD8, 0xFF]));
}

#[test]
fn export_requires_vector_content() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    assert_eq!(
        engine.raster_export(1.0, Background::White),
        Err(RenderError::UnsupportedExport {
            kind: ContentKind::Markup
        })
    );
}

#[test]
fn dispose_is_idempotent_and_final() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    let jobs = engine.take_raster_jobs();
    engine.handle_event(wheel(-1.0, 0.0, 0.0, Instant::now()));
    let generation = engine.generation();

    engine.dispose();
    engine.dispose();
    assert!(engine.is_disposed());
    assert_eq!(log.detach_count(), 1);
    assert!(engine.generation() > generation);
    assert!(engine.next_deadline().is_none());

    let calls = log.len();
    engine.set_content(WIDE_SVG, ContentKind::Vector);
    engine.zoom(2.0, screen_point(0.0, 0.0));
    engine.pan(screen_vector(1.0, 1.0));
    engine.reset();
    engine.start_interaction();
    engine.handle_event(InputEvent::PointerDown {
        position: screen_point(0.0, 0.0),
    });
    assert_eq!(log.len(), calls);
    assert!(engine.pending_jobs().is_empty());

    let rasterizer = FakeRasterizer::default();
    for job in jobs {
        assert!(!engine.complete_rasterization(job.run(&rasterizer)));
    }
    assert_eq!(
        engine.raster_export(1.0, Background::White),
        Err(RenderError::Disposed)
    );
}

#[test]
fn dropping_the_engine_detaches_once() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    drop(engine);
    assert_eq!(log.detach_count(), 1);
    assert_eq!(log.calls().iter().filter(|c| **c == Call::Detach).count(), 1);
}

#[test]
fn svg_rasterizer_snapshots_svg_embedded_in_markup() {
    let (surface, log) = RecordingSurface::new(screen_rect(0.0, 0.0, 640.0, 480.0));
    let mut engine = ViewportEngine::new(surface, ViewportOptions::default());
    engine.set_content(
        r#"<div><svg width="4" height="2"><rect width="4" height="2"/></svg></div>"#,
        ContentKind::Markup,
    );
    engine.start_interaction();
    assert_eq!(engine.drive_rasterization(), 1);
    assert!(matches!(
        log.last(),
        Some(Call::Raster {
            width: 640,
            height: 480,
            ..
        })
    ));
}

#[test]
fn svg_rasterizer_snapshot_never_exceeds_the_viewport() {
    let (surface, log) = RecordingSurface::new(screen_rect(0.0, 0.0, 100.0, 100.0));
    let mut engine = ViewportEngine::new(surface, ViewportOptions::default());
    engine.set_content(
        r#"<div><svg width="100000" height="100000"><rect width="10" height="10"/></svg></div>"#,
        ContentKind::Markup,
    );
    engine.zoom(10.0, screen_point(0.0, 0.0));
    engine.start_interaction();
    assert_eq!(engine.drive_rasterization(), 1);
    assert!(matches!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            ..
        })
    ));
}

#[test]
fn snapshot_placement_starts_at_the_surface_origin_after_earlier_pans() {
    let (mut engine, log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.pan(screen_vector(30.0, 0.0));
    engine.start_interaction();
    engine.drive_rasterization();
    assert_eq!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            placement: RasterPlacement {
                bitmap_scale: 1.0,
                offset: screen_vector(0.0, 0.0),
            },
        })
    );

    engine.pan(screen_vector(5.0, 5.0));
    assert_eq!(
        log.last(),
        Some(Call::Raster {
            width: 100,
            height: 100,
            placement: RasterPlacement {
                bitmap_scale: 1.0,
                offset: screen_vector(5.0, 5.0),
            },
        })
    );
}

#[test]
fn snapshot_from_an_earlier_interaction_is_discarded() {
    let (mut engine, _log) = engine();
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    let old_jobs = engine.take_raster_jobs();
    engine.end_interaction();

    engine.zoom(3.0, screen_point(0.0, 0.0));
    engine.start_interaction();
    let rasterizer = FakeRasterizer::default();
    for job in old_jobs {
        assert!(!engine.complete_rasterization(job.run(&rasterizer)));
    }
    assert_eq!(engine.mode_kind(), ModeKind::Vector);

    assert_eq!(engine.drive_rasterization(), 1);
    let snapshot = engine.mode().snapshot().expect("raster mode");
    assert_eq!(snapshot.captured.scale, 3.0);
}

#[test]
fn svg_rasterizer_cannot_snapshot_plain_markup() {
    let (surface, _log) = RecordingSurface::new(screen_rect(0.0, 0.0, 640.0, 480.0));
    let mut engine = ViewportEngine::new(surface, ViewportOptions::default());
    engine.set_content(MARKUP, ContentKind::Markup);
    engine.start_interaction();
    assert_eq!(engine.drive_rasterization(), 0);
    assert_eq!(engine.mode_kind(), ModeKind::Vector);
}
