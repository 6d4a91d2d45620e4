use droid_probe::device::RawObservation;
use droid_probe::view::view_model::View;

pub const SCREEN_WIDTH: u32 = 1080;
pub const SCREEN_HEIGHT: u32 = 1920;

/// Builder for view records. Views start enabled and visible; everything
/// else is opted into.
pub struct ViewBuilder {
    view: View,
}

impl ViewBuilder {
    pub fn new(temp_id: usize, class: &str) -> Self {
        let mut view = View::default();
        view.temp_id = temp_id;
        view.class = Some(class.to_string());
        view.enabled = true;
        view.visible = true;
        view.bounds = [[0, 0], [SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32]];
        ViewBuilder { view }
    }

    pub fn resource_id(mut self, id: &str) -> Self {
        self.view.resource_id = Some(id.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.view.text = Some(text.to_string());
        self
    }

    pub fn content_description(mut self, desc: &str) -> Self {
        self.view.content_description = Some(desc.to_string());
        self
    }

    pub fn bounds(mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        self.view.bounds = [[x1, y1], [x2, y2]];
        self
    }

    pub fn parent(mut self, parent: i64) -> Self {
        self.view.parent = parent;
        self
    }

    pub fn children(mut self, children: &[usize]) -> Self {
        self.view.children = children.to_vec();
        self
    }

    pub fn clickable(mut self) -> Self {
        self.view.clickable = true;
        self
    }

    pub fn long_clickable(mut self) -> Self {
        self.view.long_clickable = true;
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.view.scrollable = true;
        self
    }

    pub fn checkable(mut self) -> Self {
        self.view.checkable = true;
        self
    }

    pub fn editable(mut self) -> Self {
        self.view.editable = true;
        self
    }

    pub fn checked(mut self) -> Self {
        self.view.checked = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.view.selected = true;
        self
    }

    pub fn invisible(mut self) -> Self {
        self.view.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.view.enabled = false;
        self
    }

    pub fn build(self) -> View {
        self.view
    }
}

pub fn view(temp_id: usize, class: &str) -> ViewBuilder {
    ViewBuilder::new(temp_id, class)
}

pub fn observation(activity: &str, views: Vec<View>) -> RawObservation {
    RawObservation {
        views,
        foreground_activity: activity.to_string(),
        activity_stack: vec![activity.to_string()],
        width: SCREEN_WIDTH,
        height: SCREEN_HEIGHT,
        tag: None,
    }
}

/// The screen used by the enumerator and selector tests: one clickable
/// "Save" button and one scrollable list of three text items.
pub fn save_and_list_screen() -> RawObservation {
    observation(
        "com.example.notes.MainActivity",
        vec![
            view(0, "android.widget.FrameLayout")
                .parent(-1)
                .children(&[1, 2])
                .build(),
            view(1, "android.widget.Button")
                .parent(0)
                .resource_id("com.example.notes:id/save_btn")
                .text("Save")
                .clickable()
                .bounds(0, 0, 200, 100)
                .build(),
            view(2, "android.widget.ListView")
                .parent(0)
                .resource_id("com.example.notes:id/item_list")
                .scrollable()
                .children(&[3, 4, 5])
                .bounds(0, 100, 1080, 1920)
                .build(),
            view(3, "android.widget.TextView")
                .parent(2)
                .text("Item 1")
                .bounds(0, 100, 1080, 200)
                .build(),
            view(4, "android.widget.TextView")
                .parent(2)
                .text("Item 2")
                .bounds(0, 200, 1080, 300)
                .build(),
            view(5, "android.widget.TextView")
                .parent(2)
                .text("Item 3")
                .bounds(0, 300, 1080, 400)
                .build(),
        ],
    )
}
