use growth_core::system::DrawInstance;
use growth_core::{ParticleKind, ParticleSystem};
use wasm_bindgen::prelude::*;

fn kind_from_tag(tag: u8) -> ParticleKind {
    ParticleKind::from_tag(tag).unwrap_or_else(|| {
        web_sys::console::log_1(&format!("unknown particle type {:?}, using linked", tag as char).into());
        ParticleKind::Linked
    })
}

#[wasm_bindgen]
pub struct GrowthWorld {
    system: ParticleSystem,
    instance_buffer: Vec<DrawInstance>,
    link_buffer: Vec<u32>,
}

#[wasm_bindgen]
impl GrowthWorld {
    /// `particle_type` is the ASCII tag: `L`, `G` or `A`.
    #[wasm_bindgen(constructor)]
    pub fn new(particle_type: u8) -> GrowthWorld {
        let system = ParticleSystem::new(kind_from_tag(particle_type));
        web_sys::console::log_1(
            &format!("WASM GrowthWorld created: {:?}, {} particles", system.kind(), system.size()).into()
        );

        let mut world = GrowthWorld {
            system,
            instance_buffer: Vec::new(),
            link_buffer: Vec::new(),
        };
        world.write_draw_output();
        world
    }

    /// Advance one tick and refresh the draw buffers. Returns elapsed milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self) -> f32 {
        let start = js_sys::Date::now();
        if let Err(e) = self.system.advance() {
            web_sys::console::log_1(&format!("advance failed: {}", e).into());
        }
        self.write_draw_output();
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    /// Split one particle. Returns the new particle id, or -1 if none could split.
    #[wasm_bindgen]
    pub fn split(&mut self) -> i64 {
        let result = match self.system.split_random_particle() {
            Ok(id) => id.0 as i64,
            Err(e) => {
                web_sys::console::log_1(&format!("split failed: {}", e).into());
                -1
            }
        };
        self.write_draw_output();
        result
    }

    #[wasm_bindgen]
    pub fn reset(&mut self, particle_type: u8) {
        self.system.reset(kind_from_tag(particle_type));
        self.write_draw_output();
    }

    #[wasm_bindgen]
    pub fn fill(&mut self, amount: usize) {
        self.system.fill(amount);
        self.write_draw_output();
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.system.size()
    }

    #[wasm_bindgen]
    pub fn get_instance_buffer_ptr(&self) -> *const f32 {
        self.instance_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_instance_buffer_byte_length(&self) -> usize {
        self.instance_buffer.len() * std::mem::size_of::<DrawInstance>()
    }

    /// Pairs of particle ids, not instance buffer slots. The two only line
    /// up until the first deletion; map through the ids to draw links after that.
    #[wasm_bindgen]
    pub fn get_link_buffer_ptr(&self) -> *const u32 {
        self.link_buffer.as_ptr()
    }

    #[wasm_bindgen]
    pub fn get_link_buffer_len(&self) -> usize {
        self.link_buffer.len()
    }

    /// Copy of the flat `(x, y, z, radius)` data for callers that cannot read linear memory.
    #[wasm_bindgen]
    pub fn instance_data(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.instance_buffer.as_slice()).to_vec()
    }

    #[wasm_bindgen]
    pub fn particle_centre(&mut self) -> Vec<f32> {
        self.system.calculate_particle_centre().to_array().to_vec()
    }

    #[wasm_bindgen]
    pub fn set_light_pos(&mut self, x: f32, y: f32, z: f32) {
        self.system.set_light_pos(glam::Vec3::new(x, y, z));
    }

    #[wasm_bindgen]
    pub fn set_particle_size(&mut self, size: f32) {
        self.system.set_particle_size(size);
        self.write_draw_output();
    }

    #[wasm_bindgen]
    pub fn set_cohesion(&mut self, cohesion: i32, local_cohesion: i32) {
        self.system.set_cohesion(cohesion);
        self.system.set_local_cohesion(local_cohesion);
    }

    #[wasm_bindgen]
    pub fn set_automata(&mut self, radius: i32, time: i32) {
        self.system.set_automata_radius(radius);
        self.system.set_automata_time(time);
    }

    #[wasm_bindgen]
    pub fn set_growth(&mut self, branch_length: f32, child_threshold: u32, grow_to_light: bool) {
        self.system.set_branch_length(branch_length);
        self.system.set_child_threshold(child_threshold);
        self.system.set_grow_to_light(grow_to_light);
    }

    #[wasm_bindgen]
    pub fn set_toggles(&mut self, forces: bool, particle_death: bool, nearest_particle: bool) {
        self.system.toggle_forces(forces);
        self.system.toggle_particle_death(particle_death);
        self.system.set_nearest_particle_state(nearest_particle);
    }

    #[wasm_bindgen]
    pub fn bulge(&mut self) {
        self.system.bulge();
        self.write_draw_output();
    }

    #[wasm_bindgen]
    pub fn add_food(&mut self) {
        self.system.add_food();
        self.write_draw_output();
    }
}

impl GrowthWorld {
    fn write_draw_output(&mut self) {
        self.instance_buffer.clear();
        self.instance_buffer.extend(self.system.draw_instances());
        self.system.links_for_draw(&mut self.link_buffer);
    }
}
