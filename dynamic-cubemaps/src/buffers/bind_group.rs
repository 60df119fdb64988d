use crate::Bindable;

/// Collects bindables into a bind group; the same builder can produce the
/// group's layout, so that layouts shared by both variants (and by the
/// kernels' pipeline layouts) are derived from the resources themselves.
pub struct BindGroupBuilder<'a> {
    label: String,
    layouts: Vec<wgpu::BindGroupLayoutEntry>,
    resources: Vec<wgpu::BindingResource<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(label: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            layouts: Default::default(),
            resources: Default::default(),
        }
    }

    pub fn add(mut self, item: impl Bindable<'a>) -> Self {
        for (layout, resource) in item.bind(self.resources.len() as u32) {
            self.layouts.push(layout);
            self.resources.push(resource);
        }

        self
    }

    pub fn layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("dynamic_cubemaps_{}_layout", self.label)),
            entries: &self.layouts,
        })
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        let label = format!("dynamic_cubemaps_{}", self.label);

        let entries: Vec<_> = self
            .resources
            .into_iter()
            .enumerate()
            .map(|(binding, resource)| wgpu::BindGroupEntry {
                binding: binding as _,
                resource,
            })
            .collect();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &entries,
        })
    }
}
