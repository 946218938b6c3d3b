use svg::node::element::path::Data;
use svg::node::element::{Circle, Path, Rectangle, Text};
use svg::node::Node;

const LABEL_BAND: i32 = 20;
const LEGEND_WIDTH: i32 = 160;
const LEGEND_ROW: i32 = 14;

pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

pub struct Renderer {
    pub width: i32,
    pub height: i32,
    margin: i32,
}

impl Renderer {
    pub fn new(width: i32, height: i32, margin: i32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// Drawing area plus room to the right and below for labels.
    fn document(&self, extra_width: i32, extra_height: i32) -> svg::Document {
        let width = self.width + 2 * self.margin + extra_width;
        let height = self.height + 2 * self.margin + extra_height;
        svg::Document::new()
            .set("viewBox", (-self.margin, -self.margin, width, height))
            .set("width", width)
            .set("height", height)
    }

    /// Vertical bars scaled to the largest value, each labelled underneath.
    pub fn render_bar_chart(&self, slices: &[Slice]) -> String {
        let mut document = self.document(0, LABEL_BAND);
        let max_value = slices.iter().map(|s| s.value).fold(0.0, f64::max);
        if slices.is_empty() || max_value <= 0.0 {
            return document.to_string();
        }

        let slot = self.width as f64 / slices.len() as f64;
        for (index, slice) in slices.iter().enumerate() {
            let bar_height = slice.value / max_value * self.height as f64;
            let bar = Rectangle::new()
                .set("x", index as f64 * slot + slot * 0.1)
                .set("y", self.height as f64 - bar_height)
                .set("width", slot * 0.8)
                .set("height", bar_height)
                .set("fill", slice.color.as_str())
                .set("stroke", "#555");
            let label = Text::new(slice.label.as_str())
                .set("x", index as f64 * slot + slot / 2.0)
                .set("y", self.height + LABEL_BAND / 2 + 4)
                .set("text-anchor", "middle")
                .set("font-size", 10);
            document = document.add(bar).add(label);
        }
        document.to_string()
    }

    /// Pie centered in the drawing area with a legend on its right;
    /// zero-valued slices are skipped.
    pub fn render_pie_chart(&self, slices: &[Slice]) -> String {
        let shown = slices.iter().filter(|s| s.value > 0.0).count() as i32;
        let legend_overflow = (shown * LEGEND_ROW - self.height).max(0);
        let mut document = self.document(LEGEND_WIDTH, legend_overflow);
        let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
        if total <= 0.0 {
            return document.to_string();
        }

        let radius = self.width.min(self.height) as f64 / 2.0;
        let center = (self.width as f64 / 2.0, self.height as f64 / 2.0);
        let point = |angle: f64| {
            (
                center.0 + radius * angle.sin(),
                center.1 - radius * angle.cos(),
            )
        };

        let mut angle = 0.0;
        for (row, slice) in slices.iter().filter(|s| s.value > 0.0).enumerate() {
            let sweep = slice.value / total * std::f64::consts::TAU;
            let wedge: Box<dyn Node> = if sweep >= std::f64::consts::TAU - 1e-9 {
                Box::new(
                    Circle::new()
                        .set("cx", center.0)
                        .set("cy", center.1)
                        .set("r", radius)
                        .set("fill", slice.color.as_str())
                        .set("stroke", "#555"),
                )
            } else {
                let start = point(angle);
                let end = point(angle + sweep);
                let large_arc = if sweep > std::f64::consts::PI { 1.0 } else { 0.0 };
                let data = Data::new()
                    .move_to(center)
                    .line_to(start)
                    .elliptical_arc_to((radius, radius, 0.0, large_arc, 1.0, end.0, end.1))
                    .close();
                Box::new(
                    Path::new()
                        .set("d", data)
                        .set("fill", slice.color.as_str())
                        .set("stroke", "#555"),
                )
            };
            document = document.add(wedge).add(self.legend_entry(row as i32, slice));
            angle += sweep;
        }
        document.to_string()
    }

    fn legend_entry(&self, row: i32, slice: &Slice) -> svg::node::element::Group {
        let y = row * LEGEND_ROW;
        svg::node::element::Group::new()
            .add(
                Rectangle::new()
                    .set("x", self.width + self.margin)
                    .set("y", y)
                    .set("width", 10)
                    .set("height", 10)
                    .set("fill", slice.color.as_str())
                    .set("stroke", "#555"),
            )
            .add(
                Text::new(format!("{} ({})", slice.label, slice.value))
                    .set("x", self.width + self.margin + 14)
                    .set("y", y + 9)
                    .set("font-size", 10),
            )
    }
}
