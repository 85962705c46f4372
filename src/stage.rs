use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;

use crate::camera::{CameraRig, ScrollMapper};
use crate::picking::{LinkRegistry, LinkTarget, Navigator};
use crate::scene::SceneManifest;
use crate::stars::Starfield;
use crate::trail::{screen_to_ndc, PointerTrail};
use crate::world::{ObjectId, ObjectKind, World, WorldObject};

/// Per-frame rotation added to the decorative mesh.
const FRAME_DECOR_SPIN: Vec3 = Vec3::new(0.01, 0.005, 0.01);
/// Per-frame rotation added to each link cube.
const FRAME_CUBE_SPIN: Vec3 = Vec3::new(0.005, 0.005, 0.005);

/// Top-level controller owning all animation and interaction state.
///
/// Every event handler of the program funnels through here, so the shared
/// mutable pieces (camera pose, star list, trail queue, scroll state) live
/// in one explicit place instead of module-level globals.
pub struct LandingStage {
    world: World,
    camera: CameraRig,
    starfield: Starfield,
    trail: PointerTrail,
    links: LinkRegistry,
    scroll: ScrollMapper,
    decor: ObjectId,
    cubes: Vec<ObjectId>,
    viewport: (u32, u32),
}

impl LandingStage {
    /// Builds the scene described by the manifest and applies the initial
    /// scroll mapping at offset zero, matching the page's on-load call.
    pub fn from_manifest(
        manifest: &SceneManifest,
        viewport: (u32, u32),
        now: f32,
        rng: SmallRng,
    ) -> Self {
        let world = World::new();

        let decor = world.add(ObjectKind::Decor, |object| {
            object.position = manifest.decor.position;
            object.color = manifest.decor.color;
        });

        let mut links = LinkRegistry::new();
        let mut cubes = Vec::with_capacity(manifest.links.len());
        for link in &manifest.links {
            let id = world.add(ObjectKind::LinkCube, |object| {
                object.position = link.position;
                object.rotation = link.rotation;
                object.scale = link.scale;
                object.color = link.color;
            });
            links.register(id, link.name.clone(), link.url.clone());
            cubes.push(id);
        }

        world.add(ObjectKind::Light, |object| {
            object.position = manifest.light.position;
            object.color = manifest.light.color;
            object.intensity = manifest.light.intensity;
        });

        let starfield = Starfield::populate(&world, &manifest.starfield, now, rng);

        let viewport = (viewport.0.max(1), viewport.1.max(1));
        let camera = CameraRig::new(viewport.0 as f32 / viewport.1 as f32);

        let mut stage = Self {
            world,
            camera,
            starfield,
            trail: PointerTrail::new(),
            links,
            scroll: ScrollMapper::new(),
            decor,
            cubes,
            viewport,
        };
        stage.scrolled(0.0);
        stage
    }

    /// Advances one frame: fixed rotation increments first, then the star
    /// lifecycle.  The caller renders the resulting snapshot afterwards.
    pub fn advance_frame(&mut self, now: f32) {
        self.world.update(self.decor, |object| {
            object.rotation += FRAME_DECOR_SPIN;
        });
        for &cube in &self.cubes {
            self.world.update(cube, |object| {
                object.rotation += FRAME_CUBE_SPIN;
            });
        }
        self.starfield.update(&self.world, now);
    }

    /// Records a pointer movement as a trail marker.
    pub fn pointer_moved(&mut self, screen: Vec2) {
        self.trail
            .record(&self.world, &self.camera, screen, self.viewport);
    }

    /// Hit-tests a click and fires navigation for intersected links.
    /// Returns how many navigations fired.
    pub fn pointer_clicked(&mut self, screen: Vec2, navigator: &dyn Navigator) -> usize {
        let ndc = screen_to_ndc(screen, self.viewport);
        let Some(ray) = self.camera.ray_through(ndc) else {
            return 0;
        };
        self.links.dispatch(&self.world, &ray, navigator)
    }

    /// Applies the scroll mapping for a new absolute offset.
    pub fn scrolled(&mut self, offset: f32) {
        self.scroll.apply(
            &self.world,
            &mut self.camera,
            self.decor,
            &self.cubes,
            offset,
        );
    }

    /// Tracks a viewport resize, updating the projection aspect ratio.
    pub fn resized(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.camera.set_aspect(self.viewport.0, self.viewport.1);
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn link_targets(&self) -> &[LinkTarget] {
        self.links.targets()
    }

    /// Snapshot of every world object for rendering.
    pub fn snapshot(&self) -> Vec<WorldObject> {
        self.world.snapshot()
    }

    /// One-line state summary used by the headless runner.
    pub fn summary(&self) -> String {
        let decor_x = self
            .world
            .get(self.decor)
            .map(|object| object.position.x)
            .unwrap_or_default();
        format!(
            "Final stage state: stars={} trail={} links={} camera=({:.2}, {:.2}, {:.2}) decor_x={:.2}",
            self.world.count(ObjectKind::Star),
            self.trail.len(),
            self.cubes.len(),
            self.camera.position.x,
            self.camera.position.y,
            self.camera.position.z,
            decor_x,
        )
    }
}
