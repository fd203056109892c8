//! Freefall Lab entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use freefall_lab::driver::{LoopControl, NullRenderer, run_frame};
    use freefall_lab::measurements::MeasurementLog;
    use freefall_lab::platform::{self, DomTelemetry, RulerOverlay, dom, ids};
    use freefall_lab::renderer::RenderState;
    use freefall_lab::sim::{Action, ActionTrigger, Dispatcher, Experiment, Viewport};
    use freefall_lab::{ConfigKey, SimulationConfig};

    /// Lab instance holding all state
    struct App {
        lab: Experiment,
        config: SimulationConfig,
        trigger: ActionTrigger,
        dispatcher: Dispatcher,
        log: MeasurementLog,
        telemetry: DomTelemetry,
        ruler: RulerOverlay,
        render_state: Option<RenderState>,
        /// CSS pixel size of the canvas
        viewport: Viewport,
        loop_control: LoopControl,
        frame_handle: Option<i32>,
    }

    impl App {
        fn new(config: SimulationConfig, seed: u64, viewport: Viewport) -> Self {
            Self {
                lab: Experiment::new(config, seed),
                config,
                trigger: ActionTrigger::new(),
                dispatcher: Dispatcher::new(),
                log: MeasurementLog::new(),
                telemetry: DomTelemetry::attach(),
                ruler: RulerOverlay::default(),
                render_state: None,
                viewport,
                loop_control: LoopControl::new(),
                frame_handle: None,
            }
        }

        /// Run one animation frame
        fn frame(&mut self, dt: f32) {
            self.dispatcher.poll(&mut self.lab, &self.trigger);

            let viewport = self.viewport;
            match self.render_state.as_mut() {
                Some(render_state) => {
                    run_frame(&mut self.lab, dt, viewport, &mut self.telemetry, render_state);
                }
                None => {
                    run_frame(&mut self.lab, dt, viewport, &mut self.telemetry, &mut NullRenderer);
                }
            }

            if let Some(render_state) = &self.render_state {
                self.ruler
                    .rebuild(self.lab.stage_revision(), render_state.stage_labels());
            }
            self.ruler.update(&self.lab.camera, viewport);
        }

        /// Issue a control-panel command
        fn dispatch(&mut self, action: Action) {
            self.trigger.fire(action);
            self.dispatcher.poll(&mut self.lab, &self.trigger);
        }

        /// Apply a slider change
        fn set_config(&mut self, key: ConfigKey, value: f32) {
            self.config.set(key, value);
            if self.lab.apply_config(self.config) {
                log::info!("Restaged for {} = {}", key.as_str(), self.config.get(key));
            }
            dom::set_text(&ids::slider_value(key), &key.label(self.config.get(key)));
        }

        fn resize(&mut self, canvas: &HtmlCanvasElement) {
            let (viewport, width, height) = measure_canvas(canvas);
            self.viewport = viewport;
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
                apply_backing_size(canvas, render_state.size);
            }
        }
    }

    /// CSS size of the canvas and the backing size it wants at this pixel ratio
    fn measure_canvas(canvas: &HtmlCanvasElement) -> (Viewport, u32, u32) {
        let dpr = dom::window().device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        (Viewport::new(client_w as f32, client_h as f32), width, height)
    }

    /// Backing size as accepted by the device; CSS keeps the on-page size
    fn apply_backing_size(canvas: &HtmlCanvasElement, (width, height): (u32, u32)) {
        canvas.set_width(width);
        canvas.set_height(height);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Freefall Lab starting...");

        // Hide loading indicator
        if let Some(loading) = dom::element(ids::LOADING) {
            dom::set_hidden(&loading, true);
        }

        let canvas = dom::canvas(ids::CANVAS);
        let (viewport, width, height) = measure_canvas(&canvas);

        let config = SimulationConfig::load();
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(config, seed, viewport)));

        log::info!("Lab initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, seed).await;
        apply_backing_size(&canvas, render_state.size);
        app.borrow_mut().render_state = Some(render_state);

        sync_controls(&config);
        setup_controls(app.clone());
        setup_log_buttons(app.clone());
        setup_resize(canvas, app.clone());
        setup_teardown(app.clone());
        platform::render_log(&app.borrow().log);

        request_animation_frame(app);

        log::info!("Freefall Lab running!");
    }

    /// Show the starting config on the sliders
    fn sync_controls(config: &SimulationConfig) {
        for key in ConfigKey::ALL {
            if let Some(slider) = dom::input(&ids::slider(key)) {
                let range = key.range();
                slider.set_min(&range.start().to_string());
                slider.set_max(&range.end().to_string());
                slider.set_step(&key.step().to_string());
                slider.set_value(&config.get(key).to_string());
            }
            dom::set_text(&ids::slider_value(key), &key.label(config.get(key)));
        }
    }

    fn setup_controls(app: Rc<RefCell<App>>) {
        // Sliders
        for key in ConfigKey::ALL {
            let Some(slider) = dom::input(&ids::slider(key)) else {
                continue;
            };
            let app = app.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(value) = input.value().parse::<f32>() {
                    app.borrow_mut().set_config(key, value);
                }
            });
            let _ = slider
                .add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Action buttons
        for action in [Action::Start, Action::Pause, Action::Step, Action::Reset] {
            let Some(btn) = dom::element(&ids::button(action)) else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().dispatch(action);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_log_buttons(app: Rc<RefCell<App>>) {
        // LOG POINT
        if let Some(btn) = dom::element(ids::LOG_POINT) {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let entry = platform::snapshot_readouts();
                let mut a = app.borrow_mut();
                a.log.record(entry);
                platform::render_log(&a.log);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // CLEAR
        if let Some(btn) = dom::element(ids::LOG_CLEAR) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.log.clear();
                platform::render_log(&a.log);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().resize(&canvas);
        });
        let _ = dom::window()
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_teardown(app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            if a.loop_control.cancel() {
                if let Some(handle) = a.frame_handle.take() {
                    let _ = dom::window().cancel_animation_frame(handle);
                }
                log::info!("Animation loop stopped");
            }
        });
        let _ = dom::window()
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let handle_owner = app.clone();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let handle = dom::window()
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        handle_owner.borrow_mut().frame_handle = handle;
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let Some(dt) = a.loop_control.frame_delta(time) else {
                return;
            };
            a.frame(dt);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Freefall Lab (native) starting...");
    log::info!("The interactive lab needs a browser - run `trunk serve` to open it");

    headless_drop();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drop once without a display, logging a reading every simulated second
#[cfg(not(target_arch = "wasm32"))]
fn headless_drop() {
    use freefall_lab::driver::{NullRenderer, NullSink, run_frame};
    use freefall_lab::sim::{Action, Experiment, Viewport, action, time_to_land};
    use freefall_lab::telemetry::Readouts;
    use freefall_lab::{LogEntry, MeasurementLog, SimulationConfig};

    let config = SimulationConfig::load();
    let mut lab = Experiment::new(config, 0);
    let viewport = Viewport::new(1280.0, 720.0);
    let mut log = MeasurementLog::new();

    action::apply(&mut lab, Action::Start);
    let mut frames = 0u32;
    let landing = loop {
        let report = run_frame(&mut lab, 1.0 / 60.0, viewport, &mut NullSink, &mut NullRenderer);
        frames += 1;
        if frames % 60 == 0 {
            log.record(LogEntry::from_readouts(&Readouts::from_state(&lab.state)));
        }
        if let Some(landing) = report.landing {
            break landing;
        }
    };

    println!("\n  time (s)   height (m)   velocity (m/s)");
    for entry in log.entries.iter().rev() {
        println!("{:>10} {:>12} {:>16}", entry.time, entry.height, entry.velocity);
    }
    println!(
        "\nLanded after {} frames: t = {:.3} s, v = {:.2} m/s (closed form: {:.3} s)",
        frames,
        landing.t,
        landing.v,
        time_to_land(config.height, config.gravity)
    );
}
