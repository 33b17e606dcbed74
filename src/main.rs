use bevy::prelude::*;
use bevy::asset::AssetMetaCheck;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy_gizmos::prelude::Gizmos;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};

use hair_guides::{demo_sources, BevyLines, DebugFlags, HairConfig, HairConfigLoader};
use strand_core::{Groom, Grow, StrandBatch, VisualDebug};

#[derive(Component)]
struct Hair {
    config: Handle<HairConfig>,
    need_render: bool,
    /// Added to the configured seed, bumped on every reseed.
    seed_offset: u64,
}

#[derive(Component)]
struct GeneratedGroom(Groom);

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        canvas: Some("#bevy".into()),
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    meta_check: AssetMetaCheck::Never,
                    ..default()
                }),
        )
        .init_asset::<HairConfig>()
        .register_asset_loader(HairConfigLoader)
        .add_plugins(bevy_gizmos::GizmoPlugin)
        .insert_resource(ClearColor(Color::srgb(0.2, 0.25, 0.2)))
        .init_resource::<Orbit>()
        .init_resource::<DebugFlags>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (orbit_controls, update_view, hair_controls, watch_config, generate_hair, visual_debug),
        )
        .run();
}

fn setup(
    mut commands: Commands,
    orbit: Res<Orbit>,
    server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        bevy::core_pipeline::tonemapping::Tonemapping::None,
        orbit.transform(),
    ));
    commands.spawn((
        Hair {
            config: server.load("hair_config.toml"),
            need_render: true,
            seed_offset: 0,
        },
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::default(),
        Visibility::Visible,
    ));
}

/// Camera circling the z axis, looking at the middle of the scene.
#[derive(Resource, Debug)]
struct Orbit {
    distance: f32,
    angle: f32,
    height: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            distance: 12.,
            angle: 0.,
            height: 2.,
        }
    }
}

impl Orbit {
    fn transform(&self) -> Transform {
        let target = Vec3::Z * self.height;
        let eye = target + self.distance * Vec3::new(self.angle.sin(), -self.angle.cos(), 0.25);
        Transform::from_translation(eye).looking_at(target, Vec3::Z)
    }
}

fn update_view(orbit: Res<Orbit>, mut camera: Single<&mut Transform, With<Camera>>) {
    if orbit.is_changed() {
        **camera = orbit.transform();
    }
}

fn orbit_controls(
    mut orbit: ResMut<Orbit>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let mut turn = 0.;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        turn += time.delta_secs();
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        turn -= time.delta_secs();
    }
    let dragging = mouse.pressed(MouseButton::Left);
    let mut lift = 0.;
    for ev in motion.read().filter(|_| dragging) {
        turn -= 0.005 * ev.delta.x;
        lift += 0.01 * ev.delta.y;
    }
    let zoom: f32 = scroll.read().map(|ev| ev.y).sum();
    if turn != 0. || lift != 0. || zoom != 0. {
        orbit.angle += turn;
        orbit.height += lift;
        orbit.distance = (orbit.distance - zoom).max(1.);
    }
}

fn hair_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut hairs: Query<&mut Hair>,
    mut flags: ResMut<DebugFlags>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        for mut hair in &mut hairs {
            hair.seed_offset += 1;
            hair.need_render = true;
        }
    }
    if keyboard.just_pressed(KeyCode::KeyG) {
        flags.guides ^= true;
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        flags.fibers ^= true;
    }
    if keyboard.just_pressed(KeyCode::KeyD) {
        flags.fiber_gizmos ^= true;
    }
}

fn watch_config(mut events: EventReader<AssetEvent<HairConfig>>, mut hairs: Query<&mut Hair>) {
    for event in events.read() {
        for mut hair in &mut hairs {
            if event.is_loaded_with_dependencies(&hair.config) || event.is_modified(&hair.config) {
                hair.need_render = true;
            }
        }
    }
}

fn generate_hair(
    mut commands: Commands,
    mut hairs: Query<(Entity, &mut Hair)>,
    mut meshes: ResMut<Assets<Mesh>>,
    configs: Res<Assets<HairConfig>>,
    flags: Res<DebugFlags>,
) {
    for (e, mut hair) in hairs.iter_mut() {
        commands.entity(e).insert(if flags.fibers {
            Visibility::Visible
        } else {
            Visibility::Hidden
        });

        if !hair.need_render {
            continue;
        }
        let Some(config) = configs.get(&hair.config) else {
            continue;
        };
        hair.need_render = false;

        let seed = config.seed.wrapping_add(hair.seed_offset);
        let mut rng = StdRng::seed_from_u64(seed);
        let groom = demo_sources().and_then(|sources| {
            sources
                .grow::<StrandBatch>(&config.extract(), &mut ())?
                .grow::<Groom>(&config.randomization, &mut rng)
        });
        let groom = match groom {
            Ok(groom) => groom,
            Err(e) => {
                error!("hair generation failed, keeping the previous fibers: {e}");
                continue;
            }
        };
        info!(seed, fibers = groom.fibers.fiber_count(), "regenerated hair");

        let lines = groom.clone().grow::<BevyLines>(&(), &mut ());
        match lines {
            Ok(BevyLines(mesh)) => {
                commands.entity(e).insert(Mesh3d(meshes.add(mesh)));
            }
            Err(e) => error!("could not build the fiber mesh: {e}"),
        }
        commands.entity(e).insert(GeneratedGroom(groom));
    }
}

fn visual_debug(query: Query<&GeneratedGroom>, flags: Res<DebugFlags>, mut gizmos: Gizmos) {
    for GeneratedGroom(groom) in query.iter() {
        groom.guides.debug(&mut gizmos, flags.guides);
        groom.fibers.debug(&mut gizmos, flags.fiber_gizmos);
    }
}
