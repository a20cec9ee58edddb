use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Row {
    country: String,
    age_group: String,
    income_level: f64,
    bonuses_received: f64,
    revenue: f64,
    clv: f64,
    roi: f64,
    wagering_increase: f64,
    should_receive: bool,
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let countries = ["Austria", "Germany", "Malta", "Sweden", "UK"];
    let age_groups = ["18-25", "26-35", "36-45", "46-60", "60+"];
    // Discrete income levels so the per-level group-by has meaningful groups.
    let income_levels = [
        15_000.0, 25_000.0, 40_000.0, 55_000.0, 80_000.0, 110_000.0, 140_000.0,
    ];

    let mut rows: Vec<Row> = Vec::new();
    for _ in 0..600 {
        let country = rng.choose(&countries).to_string();
        let age_group = rng.choose(&age_groups).to_string();
        let income_level = *rng.choose(&income_levels);

        let bonuses_received = rng.gauss(120.0 + income_level / 1_000.0, 30.0).max(0.0);
        // A few customers never wagered their bonus: zero revenue rows
        // exercise the histogram's excluded-denominator policy.
        let revenue = if rng.next_f64() < 0.03 {
            0.0
        } else {
            rng.gauss(bonuses_received * 2.2, 60.0).max(0.0)
        };
        let clv = rng.gauss(3_000.0 + income_level / 20.0, 800.0).max(0.0);
        let roi = if bonuses_received > 0.0 {
            (revenue - bonuses_received) / bonuses_received
        } else {
            0.0
        };
        let wagering_increase = rng.gauss(25.0, 10.0);
        let should_receive = roi > 0.5 && rng.next_f64() < 0.9;

        rows.push(Row {
            country,
            age_group,
            income_level,
            bonuses_received,
            revenue,
            clv,
            roi,
            wagering_increase,
            should_receive,
        });
    }

    // One customer outside the income bin range stays unlabeled downstream.
    rows[0].income_level = 400_000.0;

    write_parquet(&rows, "sample_data.parquet");
    write_csv(&rows, "sample_data.csv");

    println!(
        "Wrote {} records to sample_data.parquet and sample_data.csv",
        rows.len()
    );
}

fn write_parquet(rows: &[Row], output_path: &str) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("Age_Group", DataType::Utf8, false),
        Field::new("income_level", DataType::Float64, false),
        Field::new("Amount_of_Bonuses_Received", DataType::Float64, false),
        Field::new("Revenue_from_Bonuses", DataType::Float64, false),
        Field::new("Customer_Lifetime_Value", DataType::Float64, false),
        Field::new("Bonus_ROI", DataType::Float64, false),
        Field::new("Increase_in_wagering_after_Bonus", DataType::Float64, false),
        Field::new("Should_Receive_Bonus", DataType::Boolean, false),
    ]));

    let country = StringArray::from(rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>());
    let age_group =
        StringArray::from(rows.iter().map(|r| r.age_group.as_str()).collect::<Vec<_>>());
    let income = Float64Array::from(rows.iter().map(|r| r.income_level).collect::<Vec<_>>());
    let bonuses = Float64Array::from(rows.iter().map(|r| r.bonuses_received).collect::<Vec<_>>());
    let revenue = Float64Array::from(rows.iter().map(|r| r.revenue).collect::<Vec<_>>());
    let clv = Float64Array::from(rows.iter().map(|r| r.clv).collect::<Vec<_>>());
    let roi = Float64Array::from(rows.iter().map(|r| r.roi).collect::<Vec<_>>());
    let wagering =
        Float64Array::from(rows.iter().map(|r| r.wagering_increase).collect::<Vec<_>>());
    let flag = BooleanArray::from(rows.iter().map(|r| r.should_receive).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(country),
            Arc::new(age_group),
            Arc::new(income),
            Arc::new(bonuses),
            Arc::new(revenue),
            Arc::new(clv),
            Arc::new(roi),
            Arc::new(wagering),
            Arc::new(flag),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(rows: &[Row], output_path: &str) {
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "country",
            "Age_Group",
            "income_level",
            "Amount_of_Bonuses_Received",
            "Revenue_from_Bonuses",
            "Customer_Lifetime_Value",
            "Bonus_ROI",
            "Increase_in_wagering_after_Bonus",
            "Should_Receive_Bonus",
        ])
        .expect("Failed to write CSV header");

    for r in rows {
        writer
            .write_record([
                r.country.as_str(),
                r.age_group.as_str(),
                &format!("{}", r.income_level),
                &format!("{:.2}", r.bonuses_received),
                &format!("{:.2}", r.revenue),
                &format!("{:.2}", r.clv),
                &format!("{:.4}", r.roi),
                &format!("{:.2}", r.wagering_increase),
                if r.should_receive { "true" } else { "false" },
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");
}
