use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use wgpu::{
    vertex_attr_array, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, BufferUsages, ColorTargetState,
    ColorWrites, CommandEncoderDescriptor, CompositeAlphaMode, DeviceDescriptor, FragmentState,
    Instance, LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor, PresentMode,
    PrimitiveState, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline,
    RenderPipelineDescriptor, RequestAdapterOptions, ShaderModuleDescriptor, ShaderSource,
    SurfaceConfiguration, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
    VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use super::{Canvas, Color};
use crate::math::{Rect, Vec2};

/// Wrapper around wgpu surface/device setup that draws batches of coloured quads.
pub struct Renderer<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    srgb: bool,
    quad_pipeline: QuadPipeline,
}

/// One frame worth of queued quads. Implements [`Canvas`].
pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: TextureView,
    size: Vec2,
    srgb: bool,
    clear_color: [f32; 4],
    vertices: Vec<QuadVertex>,
}

impl Drop for Frame {
    fn drop(&mut self) {
        // A frame dropped without end_frame still has to give its texture back.
        if let Some(surface_texture) = self.surface_texture.take() {
            surface_texture.present();
        }
    }
}

impl Canvas for Frame {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        // Anything queued before a clear would be painted over anyway.
        self.vertices.clear();
        self.clear_color = self.convert(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let color = self.convert(color);
        let (l, t) = (rect.x, rect.y);
        let (r, b) = (rect.x + rect.w, rect.y + rect.h);
        let corners = [[l, t], [r, t], [r, b], [l, t], [r, b], [l, b]];
        self.vertices.extend(corners.iter().map(|&position| QuadVertex {
            position,
            color,
        }));
    }
}

impl Frame {
    fn convert(&self, color: Color) -> [f32; 4] {
        if self.srgb {
            color.to_linear()
        } else {
            color.to_array()
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadUniforms {
    projection: [[f32; 4]; 4],
}

struct QuadPipeline {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("cyberspace-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let quad_pipeline = create_quad_pipeline(&device, format);
        log::debug!(
            "renderer ready: {:?}, {:?}, {}x{}",
            format,
            present_mode,
            surface_config.width,
            surface_config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            srgb: format.is_srgb(),
            quad_pipeline,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn begin_frame(&mut self) -> Result<Frame> {
        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => {
                    let view = surface_texture
                        .texture
                        .create_view(&TextureViewDescriptor::default());
                    let (width, height) = self.surface_size();
                    return Ok(Frame {
                        surface_texture: Some(surface_texture),
                        view,
                        size: Vec2::new(width as f32, height as f32),
                        srgb: self.srgb,
                        clear_color: [0.0, 0.0, 0.0, 1.0],
                        vertices: Vec::new(),
                    });
                }
                Err(e) => match e {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        self.surface.configure(&self.device, &self.surface_config);
                        continue;
                    }
                    wgpu::SurfaceError::Timeout => {
                        continue;
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        return Err(anyhow!("Surface ran out of memory"));
                    }
                    wgpu::SurfaceError::Other => {
                        return Err(anyhow!("Surface error: Other"));
                    }
                },
            }
        }
    }

    /// Draws every queued quad in one pass and presents.
    pub fn end_frame(&mut self, mut frame: Frame) -> Result<()> {
        let projection = Mat4::orthographic_rh(0.0, frame.size.x, frame.size.y, 0.0, -1.0, 1.0);
        self.queue.write_buffer(
            &self.quad_pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&QuadUniforms {
                projection: projection.to_cols_array_2d(),
            }),
        );

        let vertex_buffer = (!frame.vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("quad-vertices"),
                    contents: bytemuck::cast_slice(&frame.vertices),
                    usage: BufferUsages::VERTEX,
                })
        });

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        {
            let [r, g, b, a] = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("quad-pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(buffer) = &vertex_buffer {
                pass.set_pipeline(&self.quad_pipeline.pipeline);
                pass.set_bind_group(0, &self.quad_pipeline.bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..frame.vertices.len() as u32, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));

        let surface_texture = frame
            .surface_texture
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;
        surface_texture.present();
        Ok(())
    }
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Auto))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Opaque))
}

fn create_quad_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> QuadPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("shape-shader"),
        source: ShaderSource::Wgsl(include_str!("shape.wgsl").into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("shape-bind-group-layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(
                    std::mem::size_of::<QuadUniforms>() as u64,
                ),
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("shape-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("shape-uniform-buffer"),
        size: std::mem::size_of::<QuadUniforms>() as u64,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("shape-bind-group"),
        layout: &bind_group_layout,
        entries: &[BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("shape-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2, 1 => Float32x4],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    QuadPipeline {
        pipeline,
        uniform_buffer,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_prefers_fifo_family() {
        let modes = [PresentMode::Immediate, PresentMode::FifoRelaxed];
        assert_eq!(choose_present_mode(&modes, true), PresentMode::FifoRelaxed);
        assert_eq!(choose_present_mode(&modes, false), PresentMode::Immediate);
        assert_eq!(choose_present_mode(&[], false), PresentMode::Fifo);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_then_opaque() {
        assert_eq!(
            choose_alpha_mode(&[CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Auto]),
            CompositeAlphaMode::Auto
        );
        assert_eq!(
            choose_alpha_mode(&[CompositeAlphaMode::PostMultiplied]),
            CompositeAlphaMode::PostMultiplied
        );
        assert_eq!(choose_alpha_mode(&[]), CompositeAlphaMode::Opaque);
    }
}
