// In-memory FAT12 table
// 12-bit entries packed two per three bytes: entry n starts at byte n*3/2,
// even entries take the low 12 bits of the pair, odd entries the high 12 bits

use log::trace;
use crate::fat_common::constants::*;
use super::Fat12Geometry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fat12Table {
    data: Vec<u8>,
}

impl Fat12Table {
    /// Empty table with the reserved entries in place
    pub fn new(geometry: &Fat12Geometry, media_descriptor: u8) -> Self {
        let mut data = vec![0u8; geometry.fat_size_bytes()];
        // FAT[0] carries the media descriptor, FAT[1] is all ones
        data[0] = media_descriptor;
        data[1] = 0xFF;
        data[2] = 0xFF;
        Self { data }
    }
    
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }
    
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
    
    pub fn entry_capacity(&self) -> u32 {
        (self.data.len() * 2 / 3) as u32
    }
    
    pub fn set_entry(&mut self, cluster: u32, value: u16) {
        assert!(cluster < self.entry_capacity(), "FAT12 entry {} out of range", cluster);
        
        let value = value & FAT12_ENTRY_MASK;
        let offset = (cluster as usize * 3) / 2;
        if cluster & 1 == 1 {
            self.data[offset] = (self.data[offset] & 0x0F) | ((value << 4) as u8 & 0xF0);
            self.data[offset + 1] = (value >> 4) as u8;
        } else {
            self.data[offset] = value as u8;
            self.data[offset + 1] = (self.data[offset + 1] & 0xF0) | ((value >> 8) as u8 & 0x0F);
        }
        
        trace!("FAT12[{}] = {:#05x}", cluster, value);
    }
    
    pub fn entry(&self, cluster: u32) -> u16 {
        let offset = (cluster as usize * 3) / 2;
        if offset + 1 >= self.data.len() {
            return FAT12_FREE;
        }
        let pair = u16::from_le_bytes([self.data[offset], self.data[offset + 1]]);
        if cluster & 1 == 1 {
            pair >> 4
        } else {
            pair & FAT12_ENTRY_MASK
        }
    }
    
    pub fn mark_end_of_chain(&mut self, cluster: u32) {
        self.set_entry(cluster, FAT12_EOC);
    }
    
    /// Link `count` clusters from `start` into one contiguous chain
    pub fn link_contiguous(&mut self, start: u32, count: u32) {
        for i in 0..count {
            let cluster = start + i;
            if i + 1 < count {
                self.set_entry(cluster, (cluster + 1) as u16);
            } else {
                self.mark_end_of_chain(cluster);
            }
        }
    }
    
    /// Follow a chain from `start`, returning every cluster visited.
    /// Stops at end-of-chain, a free/reserved/bad value, or a loop.
    pub fn chain(&self, start: u32) -> Vec<u32> {
        let mut clusters = Vec::new();
        let mut current = start;
        
        while current >= FIRST_DATA_CLUSTER
            && current < self.entry_capacity()
            && clusters.len() < self.entry_capacity() as usize
        {
            clusters.push(current);
            let next = self.entry(current);
            if next >= FAT12_EOC_MIN || next == FAT12_BAD || next == FAT12_FREE {
                break;
            }
            current = next as u32;
        }
        
        clusters
    }
    
    pub fn is_end_of_chain(value: u16) -> bool {
        value >= FAT12_EOC_MIN
    }
}
