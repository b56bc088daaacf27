use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

#[path = "../group.rs"]
mod group;

use group::GROUP_CODES;

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const HEADER: [&str; 8] = [
    "Código",
    "RH",
    "Color_Cabello",
    "Barrio_Residencia",
    "Fecha_Nacimiento",
    "Estatura",
    "Peso",
    "Talla_Zapato",
];

/// The group members first, then made-up codes.
fn student_code(i: u32) -> String {
    match GROUP_CODES.get(i as usize) {
        Some(code) => code.to_string(),
        None => format!("2024{:04}0018", 1000 + i),
    }
}

fn main() -> Result<(), rust_xlsxwriter::XlsxError> {
    let mut rng = SimpleRng::new(50);

    // Deliberately messy casing and spacing; the dashboard normalises it.
    let blood_types = ["o+", "O+", "a+", "A-", "b+", "AB+", "o-"];
    let hair_colors = ["negro", "Castaño ", "CASTAÑO", "rubio", " pelirrojo", "Negro"];
    let neighborhoods = [
        "centro", "La Esperanza", "SAN JOSÉ", "el prado ", "villa del río", "Los Almendros",
        "santa fe", "Bellavista", "la floresta", "Modelo", "altos del norte", "chapinero",
    ];

    let output_path = "ListadoDeEstudiantesGrupo_050.xlsx";
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    let n_students = 40u32;
    for i in 0..n_students {
        let row = i + 1;
        sheet.write_string(row, 0, student_code(i))?;
        sheet.write_string(row, 1, rng.pick(&blood_types))?;
        sheet.write_string(row, 2, rng.pick(&hair_colors))?;
        sheet.write_string(row, 3, rng.pick(&neighborhoods))?;

        // One malformed date and one incomplete row to exercise the cleaning.
        if i == 7 {
            sheet.write_string(row, 4, "31/31/2003")?;
        } else {
            let year = 1999 + (rng.next_u64() % 8) as u16;
            let month = 1 + (rng.next_u64() % 12) as u8;
            let day = 1 + (rng.next_u64() % 28) as u8;
            let date = ExcelDateTime::from_ymd(year, month, day)?;
            sheet.write_datetime_with_format(row, 4, &date, &date_format)?;
        }

        let height = (rng.range(1.50, 1.95) * 100.0).round() / 100.0;
        let bmi = rng.range(17.0, 33.0);
        let weight = (bmi * height * height * 10.0).round() / 10.0;
        sheet.write_number(row, 5, height)?;
        if i != 12 {
            sheet.write_number(row, 6, weight)?;
        }
        let shoe = 34.0 + ((height - 1.50) * 20.0).round() + (rng.next_u64() % 3) as f64;
        sheet.write_number(row, 7, shoe)?;
    }

    workbook.save(output_path)?;
    println!("Wrote {n_students} students to {output_path}");
    Ok(())
}
