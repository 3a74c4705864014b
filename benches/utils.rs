use smap::{MapBuilder, Mapping};

// xorshift, so every run benches the same map
struct Rng(u64);

impl Rng {
    fn next(&mut self, bound: u32) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % bound as u64) as u32
    }
}

/// Generates a minified-looking source map, returning its JSON and a sample of its mappings.
pub fn generate_map(lines: u32, mappings_per_line: u32) -> (Vec<u8>, Vec<Mapping>) {
    let mut rng = Rng(0x2545_f491_4f6c_dd1d);
    let mut builder = MapBuilder::new().with_file("bundle.min.js");
    let mut samples = Vec::new();

    for line in 1..=lines {
        let mut column = 0;
        for _ in 0..mappings_per_line {
            column += 1 + rng.next(40);
            let source = format!("src/module_{}.js", rng.next(16));
            let mut mapping =
                Mapping::new(line, column).with_source(source, 1 + rng.next(2000), rng.next(120));
            if rng.next(4) == 0 {
                mapping = mapping.with_name(format!("ident{}", rng.next(256)));
            }
            if samples.len() < 64 && rng.next(256) == 0 {
                samples.push(mapping.clone());
            }
            builder.add_mapping(mapping).unwrap();
        }
    }

    (builder.to_vec().unwrap(), samples)
}
