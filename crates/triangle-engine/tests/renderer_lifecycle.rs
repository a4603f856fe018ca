use std::f32::consts::{PI, TAU};
use std::time::Duration;

use glam::{Mat4, Vec4};

use triangle_engine::backend::headless::{HeadlessBackend, HeadlessSettings};
use triangle_engine::backend::GraphicsBackend;
use triangle_engine::coords::{ColorRgba, Extent};
use triangle_engine::renderer::{FrameStatus, Renderer, RendererConfig, RendererState};
use triangle_engine::scene::{SceneDescriptor, ShaderSource, TRIANGLE_VERTICES};
use triangle_engine::{ErrorKind, RendererError};

const FRAME: Duration = Duration::from_millis(16);

fn build(extent: Extent, settings: HeadlessSettings) -> Renderer<HeadlessBackend> {
    Renderer::new(
        (),
        extent,
        &SceneDescriptor::default(),
        &settings,
        RendererConfig::default(),
    )
    .unwrap()
}

fn renderer() -> Renderer<HeadlessBackend> {
    build(Extent::clamped(1280, 720), HeadlessSettings::default())
}

fn half_fov_tan(r: &Renderer<HeadlessBackend>) -> f32 {
    (r.camera().fov_y_radians() * 0.5).tan()
}

#[test]
fn projection_tracks_every_resize() {
    let mut r = renderer();
    let sizes = [(1, 1), (1, 65_535), (65_535, 1), (640, 480), (1920, 1080), (333, 777)];

    for (w, h) in sizes {
        let extent = r.resize(w, h).unwrap();
        assert_eq!((extent.width(), extent.height()), (w, h));
        assert!(r.render(FRAME).unwrap().presented());

        let p = r.uniforms().projection;
        let t = half_fov_tan(&r);
        let aspect = w as f32 / h as f32;
        assert!((p.y_axis.y * t - 1.0).abs() < 1e-5, "{w}x{h}");
        assert!((p.x_axis.x * aspect * t - 1.0).abs() < 1e-4, "{w}x{h}");
    }
}

#[test]
fn full_turn_returns_model_to_identity() {
    let mut r = renderer();
    let steps = 120;
    let dt = Duration::from_secs_f64(std::f64::consts::TAU / steps as f64);

    for _ in 0..steps {
        r.render(dt).unwrap();
        let angle = r.rotation_angle();
        assert!((0.0..TAU).contains(&angle), "{angle}");
    }

    let model = r.uniforms().model;
    assert!(model.abs_diff_eq(Mat4::IDENTITY, 1e-3), "{model:?}");
}

#[test]
fn construction_and_destruction_balance_resources() {
    let mut r = renderer();
    let counts = r.backend().resource_counts();
    assert_eq!(counts.swapchains, 1);
    assert_eq!(counts.pipelines, 1);
    assert_eq!(counts.vertices, 3);
    assert_eq!(counts.indices, 3);
    assert_eq!(r.state(), RendererState::Ready);

    r.render(FRAME).unwrap();
    r.resize(800, 600).unwrap();
    r.render(FRAME).unwrap();
    assert_eq!(r.backend().resource_counts().swapchains, 1);

    r.destroy();
    assert_eq!(r.state(), RendererState::Destroyed);
    assert!(r.backend().resource_counts().is_empty());

    // Second destroy is a no-op.
    r.destroy();
    assert!(r.backend().resource_counts().is_empty());
}

#[test]
fn frames_are_presented_in_order_one_at_a_time() {
    let mut r = renderer();
    let statuses: Vec<FrameStatus> = (0..7)
        .map(|_| {
            let status = r.render(FRAME).unwrap();
            // The frame just submitted is the only one still on the GPU.
            assert_eq!(r.backend().frames_in_flight(), 1);
            status
        })
        .collect();

    let images: Vec<u32> = statuses
        .iter()
        .map(|s| match s {
            FrameStatus::Presented { image_index } => *image_index,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(images, vec![0, 1, 2, 0, 1, 2, 0]);

    let backend = r.backend();
    assert_eq!(backend.max_frames_in_flight(), 1);
    let order: Vec<u64> = backend.presented().map(|f| f.frame).collect();
    assert_eq!(order, (0..7).collect::<Vec<_>>());

    // Every frame after the first waited on its predecessor's fence.
    let waits: Vec<Option<u64>> = backend.presented().map(|f| f.waited_on).collect();
    let expected: Vec<Option<u64>> = (0..7u64).map(|i| i.checked_sub(1)).collect();
    assert_eq!(waits, expected);
}

#[test]
fn resize_drains_the_frame_in_flight() {
    let mut r = renderer();
    r.render(FRAME).unwrap();
    assert_eq!(r.backend().frames_in_flight(), 1);

    r.resize(640, 480).unwrap();
    assert_eq!(r.backend().frames_in_flight(), 0);

    r.render(FRAME).unwrap();
    let last = r.backend().last_presented().unwrap();
    assert_eq!(last.waited_on, None);
    assert_eq!(last.extent, Extent::clamped(640, 480));
}

#[test]
fn first_frame_matches_the_reference_scene() {
    let mut r = renderer();
    r.render(FRAME).unwrap();

    let mesh = r.backend().mesh();
    assert_eq!(mesh.vertices, TRIANGLE_VERTICES);
    assert_eq!(mesh.vertices[0].position, [1.0, 1.0, 0.0]);
    assert_eq!(mesh.vertices[0].color, ColorRgba::RED.rgb());
    assert_eq!(mesh.vertices[1].position, [-1.0, 1.0, 0.0]);
    assert_eq!(mesh.vertices[1].color, ColorRgba::GREEN.rgb());
    assert_eq!(mesh.vertices[2].position, [0.0, -1.0, 0.0]);
    assert_eq!(mesh.vertices[2].color, ColorRgba::BLUE.rgb());
    assert_eq!(mesh.indices, [0, 1, 2]);

    let u = r.uniforms();
    assert_eq!(u.view.w_axis, Vec4::new(0.0, 0.0, -2.5, 1.0));

    let fov = 2.0 * (1.0 / u.projection.y_axis.y).atan();
    assert!(fov >= PI / 4.0 - 1e-4 && fov <= PI / 3.0 + 1e-4, "{fov}");

    // What the GPU saw is what the renderer computed.
    let presented = r.backend().last_presented().unwrap();
    assert_eq!(presented.uniforms, *u);
    assert_eq!(presented.extent, Extent::clamped(1280, 720));
}

#[test]
fn resize_changes_only_the_aspect_term() {
    let mut r = renderer();
    r.render(FRAME).unwrap();
    let before = *r.uniforms();

    r.resize(640, 480).unwrap();
    let after = *r.uniforms();

    assert_eq!(before.view, after.view);
    assert_eq!(before.model, after.model);

    let t = half_fov_tan(&r);
    assert!((before.projection.x_axis.x - 1.0 / ((1280.0 / 720.0) * t)).abs() < 1e-5);
    assert!((after.projection.x_axis.x - 1.0 / ((640.0 / 480.0) * t)).abs() < 1e-5);

    let mut b = before.projection.to_cols_array();
    let mut a = after.projection.to_cols_array();
    b[0] = 0.0;
    a[0] = 0.0;
    assert_eq!(a, b);
}

#[test]
fn resize_clamps_out_of_range_sizes() {
    let mut r = renderer();
    let extent = r.resize(0, 70_000).unwrap();
    assert_eq!((extent.width(), extent.height()), (1, 65_535));
    assert_eq!(r.backend().extent(), Some(extent));
    assert!(r.render(FRAME).unwrap().presented());
}

#[test]
fn operations_after_destroy_are_rejected() {
    let mut r = renderer();
    r.destroy();

    let err = r.render(FRAME).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(matches!(
        err,
        RendererError::InvalidState {
            op: "render",
            state: RendererState::Destroyed
        }
    ));
    assert_eq!(r.resize(100, 100).unwrap_err().kind(), ErrorKind::Usage);
}

#[test]
fn stale_swapchain_is_rebuilt_and_rendering_continues() {
    let mut r = renderer();
    r.render(FRAME).unwrap();
    r.backend_mut().inject_stale_frames(1);

    assert_eq!(r.render(FRAME).unwrap(), FrameStatus::SwapchainRebuilt);
    assert_eq!(r.state(), RendererState::Ready);
    assert_eq!(r.swapchain_rebuilds(), 1);
    assert_eq!(r.backend().swapchain_builds(), 2);
    assert_eq!(r.backend().resource_counts().swapchains, 1);

    // A fresh swapchain starts again at image 0.
    assert_eq!(
        r.render(FRAME).unwrap(),
        FrameStatus::Presented { image_index: 0 }
    );
}

#[test]
fn device_loss_moves_the_renderer_to_failed() {
    let mut r = build(
        Extent::default(),
        HeadlessSettings {
            lose_device_after: Some(2),
            ..HeadlessSettings::default()
        },
    );
    r.render(FRAME).unwrap();
    r.render(FRAME).unwrap();

    let err = r.render(FRAME).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FatalDeviceLost);
    assert_eq!(r.state(), RendererState::Failed);
    assert_eq!(r.render(FRAME).unwrap_err().kind(), ErrorKind::Usage);

    r.destroy();
    assert!(r.backend().resource_counts().is_empty());
}

#[test]
fn missing_shader_file_fails_initialization() {
    let scene = SceneDescriptor::default().with_shader(ShaderSource::file("no/such/triangle.wgsl"));
    let err = Renderer::<HeadlessBackend>::new(
        (),
        Extent::default(),
        &scene,
        &HeadlessSettings::default(),
        RendererConfig::default(),
    )
    .err()
    .unwrap();

    assert_eq!(err.kind(), ErrorKind::FatalInitialization);
    assert!(matches!(err, RendererError::ShaderLoad { .. }));
}

#[test]
fn shader_can_be_loaded_from_disk() {
    let dir = std::env::temp_dir().join(format!("triangle-lifecycle-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("triangle.wgsl");
    std::fs::write(&path, triangle_engine::scene::TRIANGLE_WGSL).unwrap();

    let scene = SceneDescriptor::default().with_shader(ShaderSource::file(&path));
    let mut r = Renderer::<HeadlessBackend>::new(
        (),
        Extent::default(),
        &scene,
        &HeadlessSettings::default(),
        RendererConfig::default(),
    )
    .unwrap();
    assert!(r.render(FRAME).unwrap().presented());

    std::fs::remove_dir_all(&dir).ok();
}
