// Coloring filters - per-color transforms over the white source
//
// Each filter is a small stateful transform applied sample-by-sample. The
// synthesizer runs one filter instance over the same source twice, carrying
// this state across the pass boundary; that is what makes the rendered
// buffer loop without a seam, so none of these may reset themselves
// mid-stream.

/// One-sample-in, one-sample-out coloring transform
pub trait ColorFilter {
    fn process(&mut self, x: f32) -> f32;
}

/// White: flat spectrum, pass-through of the random source
#[derive(Debug, Default)]
pub struct WhiteFilter;

impl ColorFilter for WhiteFilter {
    fn process(&mut self, x: f32) -> f32 {
        x
    }
}

/// Pink: -3 dB/octave via Paul Kellet's refined six-accumulator shaping
///
/// Six leaky accumulators with staggered pole frequencies are summed with a
/// scaled direct term; the seventh register is a one-sample delay of the
/// input. Output gain 0.11 keeps the result inside [-1, 1] for a [-1, 1]
/// uniform source.
#[derive(Debug, Default)]
pub struct PinkFilter {
    b0: f32,
    b1: f32,
    b2: f32,
    b3: f32,
    b4: f32,
    b5: f32,
    b6: f32,
}

impl ColorFilter for PinkFilter {
    fn process(&mut self, x: f32) -> f32 {
        self.b0 = 0.99886 * self.b0 + x * 0.0555179;
        self.b1 = 0.99332 * self.b1 + x * 0.0750759;
        self.b2 = 0.96900 * self.b2 + x * 0.1538520;
        self.b3 = 0.86650 * self.b3 + x * 0.3104856;
        self.b4 = 0.55000 * self.b4 + x * 0.5329522;
        self.b5 = -0.7616 * self.b5 - x * 0.0168980;
        let out = (self.b0 + self.b1 + self.b2 + self.b3 + self.b4 + self.b5 + self.b6
            + x * 0.5362)
            * 0.11;
        self.b6 = x * 0.115926;
        out
    }
}

/// Brown: -6 dB/octave leaky integrator
///
/// `state = (state + 0.02 x) / 1.02`, scaled by 3.5 to restore audible
/// level. The leak bounds the random walk and gives the filter a short
/// memory (~50 samples), which is what lets the two-pass render converge.
#[derive(Debug, Default)]
pub struct BrownFilter {
    state: f32,
}

impl ColorFilter for BrownFilter {
    fn process(&mut self, x: f32) -> f32 {
        self.state = (self.state + 0.02 * x) / 1.02;
        self.state * 3.5
    }
}

/// Blue: +3 dB/octave via a scaled first difference
#[derive(Debug, Default)]
pub struct BlueFilter {
    prev: f32,
}

impl ColorFilter for BlueFilter {
    fn process(&mut self, x: f32) -> f32 {
        let out = 0.5 * (x - self.prev);
        self.prev = x;
        out
    }
}

/// Violet: +6 dB/octave via a scaled second difference
#[derive(Debug, Default)]
pub struct VioletFilter {
    prev: f32,
    prev2: f32,
}

impl ColorFilter for VioletFilter {
    fn process(&mut self, x: f32) -> f32 {
        let out = 0.35 * (x - 2.0 * self.prev + self.prev2);
        self.prev2 = self.prev;
        self.prev = x;
        out
    }
}
