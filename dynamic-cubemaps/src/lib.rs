//! Dynamic environment cubemaps.
//!
//! Spreads the work of keeping a scene's reflections up to date across
//! frames: each [`DynamicCubemaps::tick()`] runs exactly one stage of the
//! capture → infer → filter cycle, first for the primary cubemap and then
//! (while the scene is in full-reflections mode) for the reflections one.
//!
//! The host renderer supplies its depth and color targets through [`Frame`]
//! and reads the results through [`DynamicCubemaps::shading_views()`].

mod buffers;
mod camera;
mod config;
mod error;
mod event;
mod fallback;
mod frame;
mod kernels;
mod resources;
mod scheduler;
mod stages;
mod utils;
mod variant;

pub use dynamic_cubemaps_gpu as gpu;
use glam::Vec3;
use log::{debug, info, trace};

pub use self::buffers::*;
pub use self::camera::*;
pub use self::config::*;
pub use self::error::*;
pub use self::event::*;
pub use self::frame::*;
pub use self::kernels::*;
pub use self::resources::*;
pub use self::scheduler::*;
use self::stages::StageContext;
pub use self::variant::*;

/// Bindings at which the host's material pass expects [`ShadingViews`].
pub const SHADING_BINDINGS: [u32; 2] = [30, 31];

/// Outcome of a single [`DynamicCubemaps::tick()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Pipeline is disabled through [`Settings::enabled`]
    Disabled,

    /// Kernels have just been invalidated; the stage will run on the next
    /// tick
    Recompiling {
        /// `Settings::enable_ssr` has been toggled, so the host has to
        /// rebuild its own shaders with [`Settings::shader_defines()`]
        host_shaders: bool,
    },

    Executed(Stage),
}

#[derive(Debug)]
pub struct DynamicCubemaps {
    config: Config,
    settings: Settings,
    sources: ShaderSources,
    resources: Option<CubemapResources>,
    kernels: Kernels<wgpu::ComputePipeline>,
    scheduler: Scheduler,
    resets: PerVariant<bool>,
    previous_positions: PerVariant<Option<Vec3>>,
    full_reflections: bool,
    events: EventQueue,
}

impl DynamicCubemaps {
    pub fn new(config: Config) -> Self {
        Self {
            settings: config.settings.clone(),
            sources: ShaderSources::new(config.shader_dir.clone()),
            config,
            resources: None,
            kernels: Default::default(),
            scheduler: Default::default(),
            resets: Default::default(),
            previous_positions: Default::default(),
            full_reflections: false,
            events: Default::default(),
        }
    }

    /// Returns a handle for notifying the pipeline about external changes.
    pub fn events(&self) -> EventSender {
        self.events.sender()
    }

    /// Allocates resources sized after the reference cubemap (usually the
    /// scene's reflection probe) and compiles the kernels.
    ///
    /// Can be called again (e.g. after the device has been lost), in which
    /// case everything is recreated and the cycle starts from scratch.
    pub fn setup(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        reference: &wgpu::Texture,
    ) -> Result<()> {
        info!(
            "Setting up dynamic cubemaps; reference={}x{}",
            reference.width(),
            reference.height()
        );

        self.teardown();

        let resources = CubemapResources::new(
            device,
            queue,
            reference,
            &self.config.default_cubemap,
        )?;

        let resources = self.resources.insert(resources);

        self.scheduler = Default::default();
        self.resets = Default::default();
        self.previous_positions = Default::default();

        let compiler =
            WgslCompiler::new(device, resources.layouts(), &self.sources);

        for kind in KernelKind::ALL {
            if kind.is_reflections() && !self.settings.enable_ssr {
                continue;
            }

            // Failures are logged by the cache and reported again by the
            // first tick that needs the kernel
            let _ = self.kernels.get(&compiler, kind);
        }

        Ok(())
    }

    /// Releases all GPU resources; calling it again is a no-op.
    pub fn teardown(&mut self) {
        if let Some(resources) = self.resources.take() {
            info!("Tearing down dynamic cubemaps");

            resources.destroy();
        }

        self.kernels.invalidate();
    }

    /// Runs the current stage and advances to the next one.
    ///
    /// A stage that fails doesn't advance the cycle, so it gets retried on
    /// the next tick.
    pub fn tick(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &Frame,
    ) -> Result<Tick> {
        let recompiling = self.process_events();

        let Some(resources) = &self.resources else {
            return Err(Error::NotInitialized);
        };

        // Reported even when disabled, so the host never misses a change of
        // its shader defines
        if let Some(tick) = recompiling {
            return Ok(tick);
        }

        if !self.settings.enabled {
            return Ok(Tick::Disabled);
        }

        let stage = self.scheduler.stage();
        let variant = stage.variant();

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dynamic_cubemaps"),
            });

        let mut ctx = StageContext {
            device,
            queue,
            resources,
            kernels: &mut self.kernels,
            sources: &self.sources,
            encoder: &mut encoder,
        };

        utils::measure(stage.name(), || -> Result<()> {
            match stage.step() {
                Step::Capture => {
                    let position = stages::capture(
                        &mut ctx,
                        variant,
                        frame,
                        &mut self.resets[variant],
                        self.previous_positions[variant],
                    )?;

                    self.previous_positions[variant] = Some(position);

                    Ok(())
                }

                Step::Infer => stages::infer(&mut ctx, variant),
                Step::Filter => stages::filter(&mut ctx, variant),
            }
        })?;

        queue.submit([encoder.finish()]);

        let reflections_active = self.reflections_active();
        let next = self.scheduler.advance(reflections_active);

        trace!("Stage `{}` executed; next={}", stage.name(), next.name());

        Ok(Tick::Executed(stage))
    }

    /// Applies queued events; returns [`Tick::Recompiling`] when the current
    /// tick should be skipped because the kernels have been invalidated.
    fn process_events(&mut self) -> Option<Tick> {
        let mut recompiling = None;

        for event in self.events.drain() {
            debug!("Processing event: {event:?}");

            match event {
                Event::LoadingFinished => {
                    self.resets = PerVariant::new(true, true);
                }

                Event::ShadersChanged => {
                    self.kernels.invalidate();

                    recompiling.get_or_insert(Tick::Recompiling {
                        host_shaders: false,
                    });
                }

                Event::SceneModeChanged { full_reflections } => {
                    self.full_reflections = full_reflections;
                }

                Event::SettingsChanged(settings) => {
                    if settings.enable_ssr != self.settings.enable_ssr {
                        info!(
                            "SSR {}; recompiling",
                            if settings.enable_ssr {
                                "enabled"
                            } else {
                                "disabled"
                            }
                        );

                        self.kernels.invalidate();

                        recompiling = Some(Tick::Recompiling {
                            host_shaders: true,
                        });
                    }

                    self.settings = settings;
                }
            }
        }

        recompiling
    }

    /// Stage the next tick will execute.
    pub fn stage(&self) -> Stage {
        self.scheduler.stage()
    }

    /// Returns whether the reflections variant takes part in the cycle.
    pub fn reflections_active(&self) -> bool {
        self.full_reflections && self.settings.enable_ssr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resources(&self) -> Option<&CubemapResources> {
        self.resources.as_ref()
    }

    pub fn shading_views(&self) -> Option<ShadingViews<'_>> {
        let resources = self.resources.as_ref()?;

        let active = if self.reflections_active() {
            Variant::Reflections
        } else {
            Variant::Primary
        };

        Some(ShadingViews {
            environment: resources.variant(active).environment().cube_view(),
            primary: resources
                .variant(Variant::Primary)
                .environment()
                .cube_view(),
        })
    }
}

/// Prefiltered environments, as read by the host's material pass.
#[derive(Clone, Copy, Debug)]
pub struct ShadingViews<'a> {
    /// Environment of the currently active variant
    pub environment: &'a wgpu::TextureView,

    /// Environment of the primary variant, regardless of the scene's mode
    pub primary: &'a wgpu::TextureView,
}

impl<'a> ShadingViews<'a> {
    pub fn layout_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
        SHADING_BINDINGS.map(|binding| {
            let mut entry = SampledTexture::layout(
                binding,
                wgpu::TextureViewDimension::Cube,
                true,
            );

            entry.visibility |= wgpu::ShaderStages::FRAGMENT;
            entry
        })
    }

    pub fn entries(&self) -> [wgpu::BindGroupEntry<'a>; 2] {
        let [environment, primary] = SHADING_BINDINGS;

        [
            wgpu::BindGroupEntry {
                binding: environment,
                resource: wgpu::BindingResource::TextureView(self.environment),
            },
            wgpu::BindGroupEntry {
                binding: primary,
                resource: wgpu::BindingResource::TextureView(self.primary),
            },
        ]
    }
}
