use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use raycaster::present::{ScaleLut, blit_nearest};
use raycaster::{EngineConfig, MapData, MovementInputs, Player, Renderer, ScreenBuffer, demo};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    config: EngineConfig,
    map: MapData,
    player: Player,
    renderer: Renderer,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal buffer, column major, and its row-major copy for presenting
    frame: ScreenBuffer,
    frame_rows: Vec<u32>,
    scale_lut: ScaleLut,

    // Input
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl App {
    fn new(config: EngineConfig) -> raycaster::Result<Self> {
        let library = Arc::new(demo::demo_library()?);
        let map = MapData::load(&demo::demo_map(), library)?;
        let player = Player::spawn(&map, &config);
        let renderer = Renderer::new(&config);
        let frame = ScreenBuffer::new(config.render_width, config.render_height, config.background);
        let frame_rows = vec![0; config.render_width * config.render_height];

        Ok(Self {
            window: None,
            surface: None,
            config,
            map,
            player,
            renderer,
            frame_counter: 0,
            last_fps_print: Instant::now(),
            frame,
            frame_rows,
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        })
    }

    fn inputs(&self) -> MovementInputs {
        let bindings = [
            (KeyCode::KeyW, MovementInputs::FORWARD),
            (KeyCode::ArrowUp, MovementInputs::FORWARD),
            (KeyCode::KeyS, MovementInputs::BACKWARD),
            (KeyCode::ArrowDown, MovementInputs::BACKWARD),
            (KeyCode::KeyA, MovementInputs::STRAFE_LEFT),
            (KeyCode::KeyD, MovementInputs::STRAFE_RIGHT),
            (KeyCode::KeyQ, MovementInputs::TURN_LEFT),
            (KeyCode::ArrowLeft, MovementInputs::TURN_LEFT),
            (KeyCode::KeyE, MovementInputs::TURN_RIGHT),
            (KeyCode::ArrowRight, MovementInputs::TURN_RIGHT),
        ];
        let mut inputs = MovementInputs::NONE;
        for (key, flag) in bindings {
            if self.keys_down.contains(&key) {
                inputs.insert(flag);
            }
        }
        inputs
    }

    fn tick(&mut self) {
        // Cap dt to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;

        let inputs = self.inputs();
        self.player.update(&self.map, inputs, dt.as_secs_f64());
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.config.render_height;
        let aspect = if dst_h > 0 {
            dst_w as f64 / dst_h as f64
        } else {
            self.config.aspect()
        };
        let target_w = ((target_h as f64 * aspect).round() as usize).max(160);

        if target_w != self.frame.width() || target_h != self.frame.height() {
            self.frame = ScreenBuffer::new(target_w, target_h, self.config.background);
            self.frame_rows = vec![0; target_w * target_h];
            info!("internal frame resized to {target_w}x{target_h}");
        }

        self.player
            .camera
            .set_fov_from_vertical(self.config.fov_y_deg, target_w as f64 / target_h as f64);
        self.scale_lut = ScaleLut::new(dst_w, dst_h, target_w, target_h);
    }

    fn draw(&mut self, id: WindowId) {
        let size = match &self.window {
            Some(window) if window.id() == id => window.inner_size(),
            _ => return,
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };
        // Resize events can trail the real surface size
        let (dst_w, dst_h) = (size.width as usize, size.height as usize);
        if !self.scale_lut.matches(dst_w, dst_h) {
            self.rebuild_internal_fb_and_lut(dst_w, dst_h);
        }

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(err) = surface.resize(w, h) {
            error!("surface resize failed: {err}");
            return;
        }

        self.renderer
            .render_frame(&mut self.frame, &self.map, &self.player.camera);
        self.frame.to_row_major(&mut self.frame_rows);

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(err) => {
                error!("surface buffer unavailable: {err}");
                return;
            }
        };
        blit_nearest(&mut buf, &self.frame_rows, &self.scale_lut);
        if let Err(err) = buf.present() {
            error!("present failed: {err}");
        }

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            info!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Ray Caster")
            .with_inner_size(LogicalSize::new(1024.0, 768.0));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(err) => {
                error!("could not create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(surface) => surface,
            Err(err) => {
                error!("could not create drawing surface: {err}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        window.request_redraw();
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();
                self.draw(id);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_env();
    info!(
        "render {}x{}, vertical fov {:.1} deg",
        config.render_width, config.render_height, config.fov_y_deg
    );

    let mut app = App::new(config).inspect_err(|err| error!("failed to load level: {err}"))?;

    let event_loop = EventLoop::new()?;
    // Continuous redraws are requested from the handler itself
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut app)?;
    Ok(())
}
