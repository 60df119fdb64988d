use std::marker::PhantomData;

use bytemuck::Pod;
use log::debug;
use wgpu::util::DeviceExt;

use super::Bindable;

/// Uniform holding a single `T`, read by compute kernels.
#[derive(Debug)]
pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T> UniformBuffer<T>
where
    T: Pod,
{
    pub fn new(device: &wgpu::Device, label: impl ToString) -> Self {
        Self::with_contents(device, label, &T::zeroed())
    }

    pub fn with_contents(
        device: &wgpu::Device,
        label: impl ToString,
        data: &T,
    ) -> Self {
        let label = format!("dynamic_cubemaps_{}", label.to_string());
        let mut contents = bytemuck::bytes_of(data).to_vec();

        contents.resize(contents.len().next_multiple_of(16), 0);

        debug!("Allocating uniform `{label}`; size={}", contents.len());

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: &contents,
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    /// Schedules a write; it lands before the next submitted command buffer,
    /// so every dispatch recorded in the same submission sees the same value.
    pub fn write(&self, queue: &wgpu::Queue, data: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(data));
    }
}

impl<'a, T> Bindable<'a> for &'a UniformBuffer<T> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'a>)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let buffer: &'a wgpu::Buffer = &self.buffer;

        vec![(layout, buffer.as_entire_binding())]
    }
}
