use super::SmoothingParams;

/// First-order exponential follower: `output += (target - output) * factor`.
#[derive(Debug)]
pub struct ExponentialSmoother {
    params: SmoothingParams,
    output: f32,
    previous_output: f32,
}

impl ExponentialSmoother {
    pub fn new(params: SmoothingParams) -> Self {
        Self {
            params,
            output: 0.0,
            previous_output: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.output = 0.0;
        self.previous_output = 0.0;
    }

    pub fn update(&mut self, target: f32) -> f32 {
        self.previous_output = self.output;

        let output = self.output + (target - self.output) * self.params.factor;
        self.output = output.clamp(self.params.min_output, self.params.max_output);

        self.output
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    /// Output before the most recent update.
    pub fn previous_output(&self) -> f32 {
        self.previous_output
    }

    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }
}
